//! # Build Resources
//!
//! The persisted resource types: [`ImageBuild`] pairs one immutable
//! [`BuildSpec`] generation with its mutable [`BuildStatus`], and
//! [`BuildConfig`] is the declarative source that stamps out successive
//! `ImageBuild` generations.

use serde::{Deserialize, Serialize};

use crate::model::customizations::Customizations;
use crate::model::status::BuildStatus;

/// A single build generation: immutable spec plus mutable status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuild {
    /// Unique resource key, `{config-name}-{generation}` for triggered builds
    pub name: String,
    /// What caused this generation to exist
    pub triggered_by: TriggeredBy,
    /// Deletion marker; cascading cleanup is owned by the hosting layer
    #[serde(default)]
    pub deletion_requested: bool,
    pub spec: BuildSpec,
    #[serde(default)]
    pub status: BuildStatus,
}

impl ImageBuild {
    pub fn new(name: impl Into<String>, triggered_by: TriggeredBy, spec: BuildSpec) -> Self {
        Self {
            name: name.into(),
            triggered_by,
            deletion_requested: false,
            spec,
            status: BuildStatus::default(),
        }
    }
}

/// Provenance of a build generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggeredBy {
    /// The owning config was updated
    ConfigChange,
    /// An authenticated webhook call requested a new build
    Webhook,
}

/// Declarative description of the OS image to produce. Immutable once the
/// generation is created; the core only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Distribution identifier, e.g. `rhel-86`
    pub distribution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customizations: Option<Customizations>,
    pub target: TargetImage,
    /// Installer boot-configuration reference; opaque to the core
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kickstart: Option<NameRef>,
}

/// Target image descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetImage {
    /// CPU architecture, validated when the spec is translated to a wire
    /// request (`x86_64`, `aarch64`)
    pub architecture: String,
    pub kind: ImageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ostree: Option<OsTreeConfig>,
}

/// The kind of artifact the pipeline must ultimately produce.
///
/// `Installer` implies the two-phase pipeline: the bootable installer image
/// is assembled on top of a successfully built container image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    #[serde(rename = "edge-container")]
    Container,
    #[serde(rename = "edge-installer")]
    Installer,
}

impl ImageKind {
    /// Whether the pipeline has a second, installer phase
    pub fn requires_installer(&self) -> bool {
        matches!(self, Self::Installer)
    }
}

/// OS-tree reference carried into the compose request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsTreeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub r#ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Reference to a named sibling resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

/// Declarative build configuration: each update or webhook trigger stamps
/// out the next [`ImageBuild`] generation from `details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub name: String,
    pub details: BuildSpec,
    /// Optional template supplying baseline customizations that each
    /// generation merges underneath its own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<BuildTemplate>,
    /// Webhook trigger settings; absent means webhook triggering is refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookTrigger>,
    #[serde(default)]
    pub status: BuildConfigStatus,
}

/// Template-supplied baseline merged under a config's own customizations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customizations: Option<Customizations>,
}

/// Webhook trigger settings for a [`BuildConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookTrigger {
    /// Name of the stored shared secret compared against the caller's
    pub secret_name: String,
}

/// Mutable bookkeeping on a [`BuildConfig`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfigStatus {
    /// Generation counter; the next build is `{name}-{last_version + 1}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_version: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_kind_requires_installer() {
        assert!(ImageKind::Installer.requires_installer());
        assert!(!ImageKind::Container.requires_installer());
    }

    #[test]
    fn test_image_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&ImageKind::Container).unwrap(),
            "\"edge-container\""
        );
        assert_eq!(
            serde_json::to_string(&ImageKind::Installer).unwrap(),
            "\"edge-installer\""
        );
    }

    #[test]
    fn test_image_build_roundtrip() {
        let build = ImageBuild::new(
            "edge-device-1",
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
        );

        let json = serde_json::to_string(&build).unwrap();
        let parsed: ImageBuild = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "edge-device-1");
        assert!(!parsed.deletion_requested);
        assert!(parsed.status.conditions.is_empty());
    }
}
