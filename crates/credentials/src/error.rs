use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Password must not be empty")]
    EmptySecret,

    #[error("Invalid password work factor {0}")]
    InvalidWorkFactor(u32),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
