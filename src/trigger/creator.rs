//! # Build Generation Creator
//!
//! Stamps out the next [`ImageBuild`] generation from a [`BuildConfig`]:
//! merges template customizations underneath the config's own, bumps the
//! generation counter under the config's version token, then creates the
//! build resource named `{config-name}-{generation}`.

use std::sync::Arc;
use tracing::info;

use crate::model::{
    merge_customizations, BuildConfig, BuildConfigStatus, ImageBuild, TriggeredBy,
};
use crate::store::{BuildConfigStore, BuildStore, ResourceVersion};
use crate::trigger::{TriggerError, TriggerResult};

/// Creates successive build generations from a config
pub struct BuildCreator<S> {
    store: Arc<S>,
}

impl<S> BuildCreator<S>
where
    S: BuildConfigStore + BuildStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Read the named config and create its next build generation
    pub async fn create_next(
        &self,
        name: &str,
        triggered_by: TriggeredBy,
    ) -> TriggerResult<ImageBuild> {
        let versioned = self.store.read_config(name).await.map_err(|e| {
            if e.is_not_found() {
                TriggerError::ConfigNotFound {
                    name: name.to_string(),
                }
            } else {
                TriggerError::Store(e)
            }
        })?;

        self.create_from_config(&versioned.resource, versioned.version, triggered_by)
            .await
    }

    /// Create the next build generation from an already-read config.
    ///
    /// The generation counter is bumped first, under the caller's version
    /// token, so two concurrent triggers cannot mint the same build name:
    /// the loser's patch conflicts and nothing was created yet.
    pub async fn create_from_config(
        &self,
        config: &BuildConfig,
        version: ResourceVersion,
        triggered_by: TriggeredBy,
    ) -> TriggerResult<ImageBuild> {
        let next_version = config.status.last_version.unwrap_or(0) + 1;
        let build_name = format!("{}-{}", config.name, next_version);

        let mut spec = config.details.clone();
        if let Some(template) = &config.template {
            spec.customizations = merge_customizations(
                template.customizations.as_ref(),
                config.details.customizations.as_ref(),
            );
        }

        let status = BuildConfigStatus {
            last_version: Some(next_version),
        };
        self.store
            .patch_config_status(&config.name, version, &status)
            .await?;

        let build = ImageBuild::new(&build_name, triggered_by, spec);
        self.store.create(build.clone()).await?;

        info!(
            config = %config.name,
            build = %build_name,
            generation = next_version,
            "new build generation created"
        );

        Ok(build)
    }
}
