//! # Crate-Level Error Handling
//!
//! Structured error types using thiserror instead of `Box<dyn Error>`
//! patterns. Component boundaries own their error enums
//! ([`crate::store::StoreError`], [`crate::composer::ComposeError`],
//! [`crate::trigger::TriggerError`]); this module provides the umbrella
//! error for callers that cross those boundaries.

use thiserror::Error;

/// Top-level error for build orchestration operations
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("compose service error: {0}")]
    Compose(#[from] crate::composer::ComposeError),

    #[error("trigger error: {0}")]
    Trigger(#[from] crate::trigger::TriggerError),

    #[error("invalid build specification: {0}")]
    InvalidSpec(#[from] crate::reconciler::TranslateError),

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ForgeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForgeError::configuration("missing composer URL");
        assert!(format!("{err}").contains("configuration error"));

        let err: ForgeError = crate::reconciler::TranslateError::UnsupportedArchitecture {
            value: "sparc".to_string(),
        }
        .into();
        assert!(format!("{err}").contains("invalid build specification"));
    }
}
