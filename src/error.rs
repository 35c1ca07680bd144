use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// AppError
///
/// The error taxonomy surfaced by handlers and extractors. Every variant maps to a
/// status code and a `{"error": "..."}` JSON body, matching the shape the web client
/// already reads.
///
/// The access gate never produces these: it returns a `GateDecision`. `Forbidden` here
/// is the handler-level fallback for requests that reached a handler without the
/// gate's redirect (e.g. a donor calling a donor-only endpoint as an NGO).
#[derive(Debug, Error)]
pub enum AppError {
    /// No session, or a token that failed validation.
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated, but the role or verification state does not permit the action.
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Malformed or incomplete input, including unknown review actions.
    #[error("{0}")]
    BadRequest(String),

    /// Underlying store failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other internal failure (hashing, token signing, storage).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the logs; the client gets a generic message.
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
