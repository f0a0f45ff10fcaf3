//! Error types for sqlcraft

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sqlcraft operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while rendering or executing statements.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A value has no SQL representation
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Row objects or table metadata do not fit the statement
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Postgres execution error, forwarded unchanged
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Execution error reported by a non-Postgres executor
    #[error("Execution error: {0}")]
    Execution(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// More rows than the caller asked for
    #[error("Too many rows: expected {expected}, got {got}")]
    TooManyRows { expected: usize, got: usize },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Statement exceeded its deadline
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Statement rejected by a hook before reaching the executor
    #[error("Statement aborted: {0}")]
    Aborted(String),
}

impl SqlError {
    /// Create an invalid type error
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::InvalidType(message.into())
    }

    /// Create an invalid model error
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a too-many-rows error
    pub fn too_many_rows(expected: usize, got: usize) -> Self {
        Self::TooManyRows { expected, got }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is an encoding error
    pub fn is_invalid_type(&self) -> bool {
        matches!(self, Self::InvalidType(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
