//! # Build Request Translator
//!
//! Pure mapping from a declarative [`BuildSpec`] plus a pipeline phase to
//! the compose service wire request. No I/O, no retries: the only failure
//! mode is malformed input, which is reported to the caller and recorded as
//! a phase failure.

use thiserror::Error;

use crate::composer::types::{
    AwsS3UploadOptions, ComposeRequest, ImageRequest, WireCustomizations, WireOsTree, WireServices,
    WireUser,
};
use crate::model::{BuildSpec, Customizations};
use crate::reconciler::phase::BuildPhase;

/// Architectures the compose service accepts
const SUPPORTED_ARCHITECTURES: [&str; 2] = ["x86_64", "aarch64"];

/// Translation failures; malformed declarative input only
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("unsupported architecture: {value}")]
    UnsupportedArchitecture { value: String },

    #[error("distribution must not be empty")]
    EmptyDistribution,
}

/// Translate a build spec into the wire request for the given phase.
///
/// Exactly one upload-target configuration is set per request; the region
/// comes from daemon configuration, not from the spec.
pub fn translate(
    spec: &BuildSpec,
    phase: BuildPhase,
    upload_region: &str,
) -> Result<ComposeRequest, TranslateError> {
    if spec.distribution.is_empty() {
        return Err(TranslateError::EmptyDistribution);
    }

    let architecture = spec.target.architecture.as_str();
    if !SUPPORTED_ARCHITECTURES.contains(&architecture) {
        return Err(TranslateError::UnsupportedArchitecture {
            value: architecture.to_string(),
        });
    }

    Ok(ComposeRequest {
        distribution: spec.distribution.clone(),
        customizations: spec.customizations.as_ref().map(wire_customizations),
        image_request: ImageRequest {
            architecture: architecture.to_string(),
            image_type: phase.image_type().to_string(),
            ostree: spec.target.ostree.as_ref().map(|o| WireOsTree {
                url: o.url.clone(),
                r#ref: o.r#ref.clone(),
                parent: o.parent.clone(),
            }),
            upload_options: AwsS3UploadOptions {
                region: upload_region.to_string(),
            },
        },
    })
}

fn wire_customizations(customizations: &Customizations) -> WireCustomizations {
    WireCustomizations {
        packages: if customizations.packages.is_empty() {
            None
        } else {
            Some(customizations.packages.clone())
        },
        users: if customizations.users.is_empty() {
            None
        } else {
            Some(
                customizations
                    .users
                    .iter()
                    .map(|u| WireUser {
                        name: u.name.clone(),
                        groups: u.groups.clone(),
                        key: u.key.clone(),
                    })
                    .collect(),
            )
        },
        services: customizations.services.as_ref().map(|s| WireServices {
            enabled: if s.enabled.is_empty() {
                None
            } else {
                Some(s.enabled.clone())
            },
            disabled: if s.disabled.is_empty() {
                None
            } else {
                Some(s.disabled.clone())
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageKind, OsTreeConfig, Services, TargetImage, User};

    fn sample_spec() -> BuildSpec {
        BuildSpec {
            distribution: "rhel-86".to_string(),
            customizations: Some(Customizations {
                packages: vec!["pkg1".to_string(), "pkg2".to_string()],
                users: vec![User {
                    name: "usr1".to_string(),
                    groups: Some(vec!["group1".to_string(), "group2".to_string()]),
                    key: Some("publicKey".to_string()),
                }],
                services: Some(Services {
                    enabled: vec!["s3".to_string(), "s4".to_string()],
                    disabled: vec!["s1".to_string(), "s2".to_string()],
                }),
            }),
            target: TargetImage {
                architecture: "x86_64".to_string(),
                kind: ImageKind::Installer,
                ostree: None,
            },
            kickstart: None,
        }
    }

    #[test]
    fn test_translate_container_phase() {
        let request = translate(&sample_spec(), BuildPhase::Container, "us-east-1").unwrap();

        assert_eq!(request.distribution, "rhel-86");
        assert_eq!(request.image_request.image_type, "edge-container");
        assert_eq!(request.image_request.architecture, "x86_64");
        assert_eq!(request.image_request.upload_options.region, "us-east-1");

        let customizations = request.customizations.unwrap();
        assert_eq!(
            customizations.packages.as_deref(),
            Some(["pkg1".to_string(), "pkg2".to_string()].as_slice())
        );
        assert_eq!(customizations.users.unwrap()[0].name, "usr1");
    }

    #[test]
    fn test_translate_iso_phase_image_type() {
        let request = translate(&sample_spec(), BuildPhase::Iso, "").unwrap();
        assert_eq!(request.image_request.image_type, "edge-installer");
    }

    #[test]
    fn test_translate_carries_ostree() {
        let mut spec = sample_spec();
        spec.target.ostree = Some(OsTreeConfig {
            url: Some("https://ostree.example.com/repo".to_string()),
            r#ref: Some("rhel/8/x86_64/edge".to_string()),
            parent: None,
        });

        let request = translate(&spec, BuildPhase::Container, "").unwrap();
        let ostree = request.image_request.ostree.unwrap();
        assert_eq!(ostree.r#ref.as_deref(), Some("rhel/8/x86_64/edge"));
        assert!(ostree.parent.is_none());
    }

    #[test]
    fn test_translate_rejects_bad_input() {
        let mut spec = sample_spec();
        spec.target.architecture = "sparc".to_string();
        assert!(matches!(
            translate(&spec, BuildPhase::Container, ""),
            Err(TranslateError::UnsupportedArchitecture { .. })
        ));

        let mut spec = sample_spec();
        spec.distribution = String::new();
        assert!(matches!(
            translate(&spec, BuildPhase::Container, ""),
            Err(TranslateError::EmptyDistribution)
        ));
    }

    #[test]
    fn test_translate_is_deterministic() {
        let spec = sample_spec();
        let a = translate(&spec, BuildPhase::Container, "eu-west-1").unwrap();
        let b = translate(&spec, BuildPhase::Container, "eu-west-1").unwrap();
        assert_eq!(a, b);
    }
}
