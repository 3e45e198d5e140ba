//! # Store Error Types
//!
//! Errors of the persistence boundary. `Conflict` carries the optimistic
//! concurrency outcome the reconciler must translate into a re-read-and-
//! retry; `Unavailable` covers every transient infrastructure failure.

use thiserror::Error;

/// Errors surfaced by the persistence boundary
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("resource not found: {name}")]
    NotFound { name: String },

    #[error("resource already exists: {name}")]
    AlreadyExists { name: String },

    #[error("version conflict on {name}: expected {expected}, found {found}")]
    Conflict {
        name: String,
        expected: u64,
        found: u64,
    },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Create a not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an already-exists error
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_predicates() {
        assert!(StoreError::not_found("b-1").is_not_found());
        assert!(!StoreError::not_found("b-1").is_conflict());
        assert!(StoreError::Conflict {
            name: "b-1".to_string(),
            expected: 3,
            found: 5,
        }
        .is_conflict());
    }
}
