//! Backend-independent storage errors.

use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be reached or rejected the statement.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What the store was doing.
        message: String,
        /// Backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A uniqueness constraint rejected the write.
    #[error("storage conflict: {message}")]
    Conflict {
        /// What the store was doing.
        message: String,
    },
    /// A persisted row could not be decoded into its entity.
    #[error("corrupt row: {message}")]
    Corrupt {
        /// Which value failed to decode.
        message: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Whether the failure is a uniqueness violation the caller may recover from.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Translate a sqlx failure, surfacing unique violations as [`StorageError::Conflict`].
pub(crate) fn from_sqlx(message: impl Into<String>, err: sqlx::Error) -> StorageError {
    let message = message.into();
    let unique = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if unique {
        StorageError::Conflict { message }
    } else {
        StorageError::unavailable(message, err)
    }
}
