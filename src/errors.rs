use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::templates;

/// RepositoryError
///
/// Failures raised by the persistence layer. Uniqueness violations are surfaced
/// separately so handlers can turn them into form feedback.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("email has already been taken")]
    DuplicateEmail,
    #[error("restaurant name has already been taken")]
    DuplicateName,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// AppError
///
/// Request failures that end in an error page rather than a re-rendered form
/// or a redirect.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // Detail stays in the logs; the page only carries the status.
            tracing::error!(error = %self, "request failed");
        }
        (status, Html(templates::error_page(status))).into_response()
    }
}
