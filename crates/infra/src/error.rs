use thiserror::Error;

use pagecraft_core::DomainError;
use pagecraft_pages::MutationResult;

use crate::page_store::StoreError;

/// Error returned by the editing engines (ordering, variables, assembly, sessions).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Caller input rejected (bad kind, blank key, part of another page, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The page changed since it was read, or a unique key is taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence failed for a reason the caller cannot fix.
    #[error(transparent)]
    Store(StoreError),

    /// The mutation committed but the page could not be reloaded afterwards.
    /// Retrying would apply `result` twice.
    #[error("change committed but the page reload failed: {reason}")]
    ReloadFailed {
        result: Box<MutationResult>,
        reason: String,
    },
}

impl EditError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Short machine-readable code, used in logs and HTTP bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EditError::Validation(_) => "validation_error",
            EditError::NotFound(_) => "not_found",
            EditError::Conflict(_) => "conflict",
            EditError::Store(_) => "store_error",
            EditError::ReloadFailed { .. } => "reload_failed",
        }
    }
}

impl From<StoreError> for EditError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(msg) => EditError::NotFound(msg),
            StoreError::Concurrency(msg) | StoreError::Duplicate(msg) => EditError::Conflict(msg),
            other @ (StoreError::InvalidWrite(_) | StoreError::Backend(_)) => EditError::Store(other),
        }
    }
}

impl From<DomainError> for EditError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => EditError::Validation(msg),
            DomainError::InvariantViolation(msg) => EditError::Validation(msg),
            DomainError::NotFound(msg) => EditError::NotFound(msg),
            DomainError::Conflict(msg) => EditError::Conflict(msg),
        }
    }
}
