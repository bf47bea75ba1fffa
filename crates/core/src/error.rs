//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, missing
/// items, business-rule rejections). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input). Caller bug; not retryable.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced stock item does not exist.
    #[error("item not found")]
    NotFound,

    /// A withdrawal asked for more than the current stock level.
    ///
    /// Carries the available quantity so callers can display it.
    #[error("insufficient stock (available: {available})")]
    InsufficientStock { available: i64 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(available: i64) -> Self {
        Self::InsufficientStock { available }
    }
}
