//! Error types for trigger translation and task storage

use thiserror::Error;

/// Errors raised while validating or translating triggers.
///
/// All of these are deterministic functions of the input and are never
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// Bad manifest input: invalid value, conflicting options, out of range bitmask...
    #[error("{0}")]
    Validation(String),

    #[error("Unknown trigger option(s): {}", .0.join(", "))]
    UnknownOptions(Vec<String>),

    /// Trigger kind that the target model cannot represent
    #[error("Unknown trigger type {0}")]
    UnknownTriggerType(String),

    /// Wrong argument shape (e.g. a string where a hash is required)
    #[error("Type error: {0}")]
    Type(String),
}

impl TriggerError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        TriggerError::Validation(message.into())
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        TriggerError::Type(message.into())
    }
}

pub type TriggerResult<T> = Result<T, TriggerError>;

/// Errors raised by task store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Trigger(#[from] TriggerError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_options_lists_every_key() {
        let err = TriggerError::UnknownOptions(vec!["foo".into(), "bar".into()]);
        assert_eq!(err.to_string(), "Unknown trigger option(s): foo, bar");
    }

    #[test]
    fn trigger_errors_convert_into_store_errors() {
        let err: StoreError = TriggerError::validation("bad").into();
        assert!(matches!(err, StoreError::Trigger(TriggerError::Validation(_))));
        assert_eq!(err.to_string(), "bad");
    }
}
