use crate::error::{ForgeError, Result};

/// Runtime configuration for the orchestration daemon.
///
/// All settings are overridable through `OSFORGE_*` environment variables;
/// defaults target a local compose service instance.
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// Base URL of the compose service API
    pub composer_url: String,
    /// Region recorded in the upload-target section of every compose request
    pub upload_region: String,
    /// Bind address for the webhook trigger server
    pub webhook_bind_addr: String,
    /// Per-request timeout for compose service calls, in seconds
    pub composer_timeout_secs: u64,
    /// Wall-clock budget for one reconcile invocation, in seconds
    pub reconcile_deadline_secs: u64,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            composer_url: "http://localhost:8700".to_string(),
            upload_region: String::new(),
            webhook_bind_addr: "0.0.0.0:8080".to_string(),
            composer_timeout_secs: 15,
            reconcile_deadline_secs: 30,
        }
    }
}

impl ForgeConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("OSFORGE_COMPOSER_URL") {
            config.composer_url = url;
        }

        if let Ok(region) = std::env::var("OSFORGE_UPLOAD_REGION") {
            config.upload_region = region;
        }

        if let Ok(addr) = std::env::var("OSFORGE_WEBHOOK_BIND_ADDR") {
            config.webhook_bind_addr = addr;
        }

        if let Ok(timeout) = std::env::var("OSFORGE_COMPOSER_TIMEOUT_SECS") {
            config.composer_timeout_secs = timeout.parse().map_err(|e| {
                ForgeError::configuration(format!("Invalid composer_timeout_secs: {e}"))
            })?;
        }

        if let Ok(deadline) = std::env::var("OSFORGE_RECONCILE_DEADLINE_SECS") {
            config.reconcile_deadline_secs = deadline.parse().map_err(|e| {
                ForgeError::configuration(format!("Invalid reconcile_deadline_secs: {e}"))
            })?;
        }

        Ok(config)
    }
}
