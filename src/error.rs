use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::MessageResponse;

/// AppError
///
/// Every failure a handler or middleware can surface. Each variant renders as a JSON
/// body of the form `{"message": "..."}` with the matching HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, malformed, expired or wrongly signed bearer token.
    #[error("unauthorized access")]
    Unauthorized,

    /// Authenticated, but not allowed: role is not admin or the email does not match.
    #[error("forbidden access")]
    Forbidden,

    /// A path segment that should be an ObjectId is not 24 hex characters.
    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::Token(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Driver and token internals stay in the log, never in the body.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = MessageResponse { message };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
