//! # Compose Service Error Types
//!
//! Structured errors for the compose boundary. The split that matters to
//! the reconciler is `Transport` (the service could not be reached or
//! answered unusably, worth retrying) versus `Rejected` (the service
//! understood the submission and refused it, not worth retrying).

use thiserror::Error;

/// Errors surfaced by the compose service boundary
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("compose service unreachable: {message}")]
    Transport { message: String },

    #[error("compose request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected compose service response: {message}")]
    InvalidResponse { message: String },
}

impl ComposeError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejection error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid-response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Whether the service actively refused the request; everything else is
    /// assumed recoverable
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl From<reqwest::Error> for ComposeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ComposeError::invalid_response(err.to_string())
        } else {
            ComposeError::transport(err.to_string())
        }
    }
}

/// Result type alias for compose boundary operations
pub type ComposeResult<T> = Result<T, ComposeError>;
