//! # In-Memory Store
//!
//! A `DashMap`-backed implementation of the persistence boundary with real
//! compare-and-swap semantics on a per-key version counter. Backs the test
//! suites and the local single-process driver; a production deployment
//! implements the same traits over its versioned document store.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::model::{BuildConfig, BuildConfigStatus, BuildStatus, ImageBuild};
use crate::store::{
    BuildConfigStore, BuildStore, ResourceVersion, SecretStore, StoreError, StoreResult, Versioned,
};

/// In-memory versioned store for builds, configs, and webhook secrets
#[derive(Default)]
pub struct InMemoryStore {
    builds: DashMap<String, (ImageBuild, u64)>,
    configs: DashMap<String, (BuildConfig, u64)>,
    secrets: DashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a build config
    pub fn insert_config(&self, config: BuildConfig) {
        self.configs.insert(config.name.clone(), (config, 1));
    }

    /// Seed a webhook secret
    pub fn insert_secret(&self, name: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(name.into(), value.into());
    }

    /// Mark a build for deletion, as the hosting layer would
    pub fn mark_deleted(&self, name: &str) -> StoreResult<()> {
        let mut entry = self
            .builds
            .get_mut(name)
            .ok_or_else(|| StoreError::not_found(name))?;
        entry.value_mut().0.deletion_requested = true;
        entry.value_mut().1 += 1;
        Ok(())
    }
}

#[async_trait]
impl BuildStore for InMemoryStore {
    async fn read(&self, name: &str) -> StoreResult<Versioned<ImageBuild>> {
        let entry = self
            .builds
            .get(name)
            .ok_or_else(|| StoreError::not_found(name))?;
        let (build, version) = entry.value();
        Ok(Versioned {
            resource: build.clone(),
            version: ResourceVersion(*version),
        })
    }

    async fn patch_status(
        &self,
        name: &str,
        expected: ResourceVersion,
        status: &BuildStatus,
    ) -> StoreResult<ResourceVersion> {
        let mut entry = self
            .builds
            .get_mut(name)
            .ok_or_else(|| StoreError::not_found(name))?;
        let (build, version) = entry.value_mut();
        if *version != expected.0 {
            return Err(StoreError::Conflict {
                name: name.to_string(),
                expected: expected.0,
                found: *version,
            });
        }
        build.status = status.clone();
        *version += 1;
        Ok(ResourceVersion(*version))
    }

    async fn create(&self, build: ImageBuild) -> StoreResult<ResourceVersion> {
        use dashmap::mapref::entry::Entry;

        match self.builds.entry(build.name.clone()) {
            Entry::Occupied(occupied) => Err(StoreError::already_exists(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                vacant.insert((build, 1));
                Ok(ResourceVersion(1))
            }
        }
    }
}

#[async_trait]
impl BuildConfigStore for InMemoryStore {
    async fn read_config(&self, name: &str) -> StoreResult<Versioned<BuildConfig>> {
        let entry = self
            .configs
            .get(name)
            .ok_or_else(|| StoreError::not_found(name))?;
        let (config, version) = entry.value();
        Ok(Versioned {
            resource: config.clone(),
            version: ResourceVersion(*version),
        })
    }

    async fn patch_config_status(
        &self,
        name: &str,
        expected: ResourceVersion,
        status: &BuildConfigStatus,
    ) -> StoreResult<ResourceVersion> {
        let mut entry = self
            .configs
            .get_mut(name)
            .ok_or_else(|| StoreError::not_found(name))?;
        let (config, version) = entry.value_mut();
        if *version != expected.0 {
            return Err(StoreError::Conflict {
                name: name.to_string(),
                expected: expected.0,
                found: *version,
            });
        }
        config.status = status.clone();
        *version += 1;
        Ok(ResourceVersion(*version))
    }
}

#[async_trait]
impl SecretStore for InMemoryStore {
    async fn read_secret(&self, name: &str) -> StoreResult<String> {
        self.secrets
            .get(name)
            .map(|v| v.value().clone())
            .ok_or_else(|| StoreError::not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildSpec, ImageKind, TargetImage, TriggeredBy};

    fn sample_build(name: &str) -> ImageBuild {
        ImageBuild::new(
            name,
            TriggeredBy::ConfigChange,
            BuildSpec {
                distribution: "rhel-86".to_string(),
                customizations: None,
                target: TargetImage {
                    architecture: "x86_64".to_string(),
                    kind: ImageKind::Container,
                    ostree: None,
                },
                kickstart: None,
            },
        )
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.read("absent").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_patch_bumps_version() {
        let store = InMemoryStore::new();
        store.create(sample_build("b-1")).await.unwrap();

        let read = store.read("b-1").await.unwrap();
        assert_eq!(read.version, ResourceVersion(1));

        let next = store
            .patch_status("b-1", read.version, &read.resource.status)
            .await
            .unwrap();
        assert_eq!(next, ResourceVersion(2));
    }

    #[tokio::test]
    async fn test_stale_patch_conflicts() {
        let store = InMemoryStore::new();
        store.create(sample_build("b-1")).await.unwrap();

        let read = store.read("b-1").await.unwrap();
        store
            .patch_status("b-1", read.version, &read.resource.status)
            .await
            .unwrap();

        // Patching again with the old token must be rejected.
        let err = store
            .patch_status("b-1", read.version, &read.resource.status)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = InMemoryStore::new();
        store.create(sample_build("b-1")).await.unwrap();
        let err = store.create(sample_build("b-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }
}
