//! Service errors and their HTTP rendering.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{
    dao::{models::InvalidSessionId, storage::StorageError},
    slides::ProviderError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// Invalid input provided by the client.
    #[error("{0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("{0}")]
    NotFound(String),
    /// Answers are submitted while the session is not live.
    #[error("Polling is closed")]
    PollingClosed,
    /// The player does not exist in the given session.
    #[error("player {player_id} not found in session {session_id}")]
    PlayerNotFound {
        /// Requested player.
        player_id: i64,
        /// Session named in the request.
        session_id: String,
    },
    /// Requested slide index is outside the cached slide list.
    #[error("slideIndex must be between 0 and {}", .len.saturating_sub(1))]
    IndexOutOfRange {
        /// Requested index.
        index: i64,
        /// Length of the slide list it was checked against.
        len: usize,
    },
    /// The session has no presentation to read slides from.
    #[error("Presentation ID not found")]
    PresentationNotLinked,
    /// The presentation provider could not serve the request.
    #[error("presentation unavailable")]
    PresentationUnavailable(#[source] ProviderError),
    /// No presentation provider was configured at start-up.
    #[error("presentation provider not configured")]
    ProviderNotConfigured,
    /// No free session code could be secured.
    #[error("failed to generate unique session ID after {attempts} attempts")]
    AllocationExhausted {
        /// Allocator draws, or inserts lost to a concurrent writer.
        attempts: u32,
    },
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<ProviderError> for ServiceError {
    fn from(err: ProviderError) -> Self {
        ServiceError::PresentationUnavailable(err)
    }
}

impl From<InvalidSessionId> for ServiceError {
    fn from(err: InvalidSessionId) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::PollingClosed | ServiceError::IndexOutOfRange { .. } => {
                AppError::BadRequest(err.to_string())
            }
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::PlayerNotFound { .. } => AppError::NotFound("Player not found".into()),
            ServiceError::PresentationNotLinked => AppError::NotFound(err.to_string()),
            ServiceError::Storage(ref source) => {
                error!(error = %source, "storage failure");
                AppError::Internal(err.to_string())
            }
            ServiceError::PresentationUnavailable(ref source) => {
                error!(error = %source, "presentation provider failure");
                AppError::Internal(err.to_string())
            }
            ServiceError::ProviderNotConfigured | ServiceError::AllocationExhausted { .. } => {
                error!(error = %err, "request failed");
                AppError::Internal(err.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
