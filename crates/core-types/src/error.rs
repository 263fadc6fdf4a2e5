use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    MissingFields(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
