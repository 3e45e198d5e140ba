// Trigger boundary: turns config updates and authenticated webhook calls
// into new build generations. Precondition events for the reconciler, not
// part of the state machine itself.

pub mod creator;
pub mod webhook;

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the trigger boundary
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("build config not found: {name}")]
    ConfigNotFound { name: String },

    #[error("build config {name} does not allow webhook triggering")]
    WebhookNotConfigured { name: String },

    #[error("webhook secret not found: {name}")]
    SecretNotFound { name: String },

    #[error("webhook secret mismatch")]
    Forbidden,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for trigger operations
pub type TriggerResult<T> = Result<T, TriggerError>;

pub use creator::BuildCreator;
pub use webhook::{router, WebhookState};
