//! # Image Customizations
//!
//! The customization set applied to a composed image, and the deterministic
//! merge of template-supplied customizations underneath a config's own.

use serde::{Deserialize, Serialize};

/// Customization set for a build: extra packages, user accounts, and
/// systemd service toggles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customizations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Services>,
}

/// User account created on the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    /// SSH public key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Service enable/disable lists applied at image build time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Services {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
}

/// Merge template customizations underneath config customizations.
///
/// The config side wins wherever both provide a value for the same thing:
/// users are keyed by name, package and service lists are unioned with the
/// template's entries first. Order is preserved so the merge is
/// deterministic for identical inputs.
pub fn merge_customizations(
    template: Option<&Customizations>,
    config: Option<&Customizations>,
) -> Option<Customizations> {
    match (template, config) {
        (None, None) => None,
        (Some(t), None) => Some(t.clone()),
        (None, Some(c)) => Some(c.clone()),
        (Some(t), Some(c)) => {
            let mut packages = t.packages.clone();
            for pkg in &c.packages {
                if !packages.contains(pkg) {
                    packages.push(pkg.clone());
                }
            }

            let mut users = t.users.clone();
            for user in &c.users {
                match users.iter_mut().find(|u| u.name == user.name) {
                    Some(existing) => *existing = user.clone(),
                    None => users.push(user.clone()),
                }
            }

            let services = match (&t.services, &c.services) {
                (None, None) => None,
                (Some(s), None) => Some(s.clone()),
                (None, Some(s)) => Some(s.clone()),
                (Some(ts), Some(cs)) => {
                    let mut enabled = ts.enabled.clone();
                    for svc in &cs.enabled {
                        if !enabled.contains(svc) {
                            enabled.push(svc.clone());
                        }
                    }
                    let mut disabled = ts.disabled.clone();
                    for svc in &cs.disabled {
                        if !disabled.contains(svc) {
                            disabled.push(svc.clone());
                        }
                    }
                    Some(Services { enabled, disabled })
                }
            };

            Some(Customizations {
                packages,
                users,
                services,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, key: &str) -> User {
        User {
            name: name.to_string(),
            groups: None,
            key: Some(key.to_string()),
        }
    }

    #[test]
    fn test_merge_prefers_config_users() {
        let template = Customizations {
            packages: vec!["vim".to_string()],
            users: vec![user("admin", "template-key")],
            services: None,
        };
        let config = Customizations {
            packages: vec!["git".to_string(), "vim".to_string()],
            users: vec![user("admin", "config-key"), user("dev", "dev-key")],
            services: None,
        };

        let merged = merge_customizations(Some(&template), Some(&config)).unwrap();
        assert_eq!(merged.packages, vec!["vim", "git"]);
        assert_eq!(merged.users.len(), 2);
        assert_eq!(merged.users[0].key.as_deref(), Some("config-key"));
    }

    #[test]
    fn test_merge_unions_services() {
        let template = Customizations {
            services: Some(Services {
                enabled: vec!["sshd".to_string()],
                disabled: vec!["bluetooth".to_string()],
            }),
            ..Default::default()
        };
        let config = Customizations {
            services: Some(Services {
                enabled: vec!["podman".to_string(), "sshd".to_string()],
                disabled: vec![],
            }),
            ..Default::default()
        };

        let merged = merge_customizations(Some(&template), Some(&config)).unwrap();
        let services = merged.services.unwrap();
        assert_eq!(services.enabled, vec!["sshd", "podman"]);
        assert_eq!(services.disabled, vec!["bluetooth"]);
    }

    #[test]
    fn test_merge_single_side_passthrough() {
        let only = Customizations {
            packages: vec!["curl".to_string()],
            ..Default::default()
        };
        assert_eq!(
            merge_customizations(Some(&only), None),
            Some(only.clone())
        );
        assert_eq!(merge_customizations(None, Some(&only)), Some(only));
        assert_eq!(merge_customizations(None, None), None);
    }
}
