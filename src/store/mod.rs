//! # Persistence Boundary
//!
//! Trait seams over the external object store. The core never talks to a
//! database directly: it reads a versioned resource, mutates a clone, and
//! patches the status back under the version token it read; any versioned
//! document store satisfies the contract. Stale tokens are rejected with
//! [`StoreError::Conflict`] and the caller re-reads and retries the whole
//! reconcile step.

pub mod errors;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{BuildConfigStatus, BuildStatus};

pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryStore;

/// Opaque optimistic-concurrency token handed out on every read and
/// refreshed by every accepted patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceVersion(pub u64);

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resource paired with the version token it was read at
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub resource: T,
    pub version: ResourceVersion,
}

/// Read/patch access to persisted [`crate::model::ImageBuild`] resources
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Read a build and its current version token
    async fn read(&self, name: &str) -> StoreResult<Versioned<crate::model::ImageBuild>>;

    /// Patch only the status of a build, guarded by the version token the
    /// caller read; returns the new token on success
    async fn patch_status(
        &self,
        name: &str,
        expected: ResourceVersion,
        status: &BuildStatus,
    ) -> StoreResult<ResourceVersion>;

    /// Create a new build generation
    async fn create(&self, build: crate::model::ImageBuild) -> StoreResult<ResourceVersion>;
}

/// Read/patch access to persisted [`crate::model::BuildConfig`] resources
#[async_trait]
pub trait BuildConfigStore: Send + Sync {
    async fn read_config(&self, name: &str) -> StoreResult<Versioned<crate::model::BuildConfig>>;

    async fn patch_config_status(
        &self,
        name: &str,
        expected: ResourceVersion,
        status: &BuildConfigStatus,
    ) -> StoreResult<ResourceVersion>;
}

/// Shared-secret lookup for webhook validation
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn read_secret(&self, name: &str) -> StoreResult<String>;
}
