//! Error types for the repository layer and HTTP response mapping.
//!
//! `RepositoryError` is the typed failure of every core operation. Absence
//! that is normal (no README, no LICENSE, no `.gitmodules`) is reported as
//! `None` or an empty list instead.
//!
//! `AppError` is what route handlers return. Axum's `IntoResponse` maps:
//! - every `RepositoryError` → 404 (backend failures are logged as well)
//! - `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Repository '{0}' is not a Git repository")]
    NotAVersionControlRepository(String),

    #[error("Repository '{0}' does not exist")]
    RepositoryDoesNotExist(String),

    #[error("Repository '{0}' is empty")]
    EmptyRepository(String),

    #[error("No such revision: {0}")]
    NoSuchRevision(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Corrupt submodule configuration: {0}")]
    CorruptSubmoduleConfig(String),

    #[error("Git error: {0}")]
    BackendFailure(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Repository(e @ RepositoryError::BackendFailure(_))
            | AppError::Repository(e @ RepositoryError::Io(_)) => {
                tracing::warn!("backend failure: {}", e);
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::Repository(e) => (StatusCode::NOT_FOUND, e.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
