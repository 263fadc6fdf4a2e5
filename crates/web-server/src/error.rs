use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::CoreError;
use credentials::CredentialError;
use database::DbError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Hibás kérés törzs: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Hibás azonosító: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Hibás lekérdezési paraméter: {}", rejection.body_text()))
    }
}

/// The uniform error body of every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Server-side failures are logged here; the body only ever carries a short
/// message and never any credential material.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::Database(DbError::Duplicate(column)) => (
                StatusCode::CONFLICT,
                format!("A megadott {column} már foglalt"),
                None,
            ),
            AppError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Adatbázis hiba történt".to_string(),
                    Some(db_err.to_string()),
                )
            }
            AppError::Credential(CredentialError::EmptySecret) => (
                StatusCode::BAD_REQUEST,
                "A jelszó nem lehet üres".to_string(),
                None,
            ),
            AppError::Credential(cred_err) => {
                tracing::error!(error = %cred_err, "Credential error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Hiba a jelszó feldolgozása során".to_string(),
                    None,
                )
            }
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Belső szerverhiba".to_string(),
                    Some(detail),
                )
            }
        };

        let body = Json(ErrorBody {
            success: false,
            error,
            details,
        });
        (status, body).into_response()
    }
}
