//! Unified error type for the keyword lifecycle service.

use crate::entities::KeywordStatus;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Error returned by a generation adapter. Adapters are free to use any error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Keyword not found: {id}")]
    KeywordNotFound { id: i64 },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Cannot {event} keyword {id} while it is {from}")]
    InvalidTransition {
        id: i64,
        from: KeywordStatus,
        event: &'static str,
    },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Generation failed for \"{keyword}\": {source}")]
    GenerationFailed {
        keyword: String,
        #[source]
        source: BoxError,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict { message },
            _ => Self::StorageUnavailable {
                message: err.to_string(),
            },
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_are_storage_unavailable() {
        let err: Error = DbErr::Custom("connection reset".to_string()).into();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = Error::InvalidTransition {
            id: 7,
            from: KeywordStatus::Generating,
            event: "begin generation for",
        };
        assert_eq!(
            err.to_string(),
            "Cannot begin generation for keyword 7 while it is generating"
        );
    }
}
