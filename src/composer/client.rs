//! # Compose Service Client
//!
//! Stateless HTTP adapter for the compose service: one call to submit a
//! build, one call to poll a job. The [`ComposeService`] trait is the seam
//! the reconciler depends on; tests substitute scripted implementations.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::composer::errors::{ComposeError, ComposeResult};
use crate::composer::types::{
    ComposeRequest, ComposeStatus, ComposeStatusResponse, ComposeSubmitted,
};

/// Submit/poll operations against the external build service.
///
/// Both operations are idempotent only from the caller's perspective: the
/// reconciler's job-id guard ensures a build is submitted once, the service
/// itself does not deduplicate.
#[async_trait]
pub trait ComposeService: Send + Sync {
    /// Submit a compose request, returning the job handle on acceptance
    async fn submit(&self, request: &ComposeRequest) -> ComposeResult<Uuid>;

    /// Poll the status of a previously submitted job
    async fn poll(&self, id: Uuid) -> ComposeResult<ComposeStatus>;
}

/// HTTP implementation of [`ComposeService`] against the compose v2 API
pub struct HttpComposeClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpComposeClient {
    /// Create a client for the given base URL with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ComposeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComposeError::transport(format!("building HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn compose_url(&self) -> String {
        format!("{}/api/image-builder-composer/v2/compose", self.base_url)
    }

    fn status_url(&self, id: Uuid) -> String {
        format!(
            "{}/api/image-builder-composer/v2/composes/{id}",
            self.base_url
        )
    }
}

#[async_trait]
impl ComposeService for HttpComposeClient {
    async fn submit(&self, request: &ComposeRequest) -> ComposeResult<Uuid> {
        let response = self
            .client
            .post(self.compose_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::CREATED => {
                let body: ComposeSubmitted = response.json().await?;
                debug!(compose_id = %body.id, "compose request accepted");
                Ok(body.id)
            }
            s if s.is_client_error() => {
                let message = response.text().await.unwrap_or_default();
                Err(ComposeError::rejected(status.as_u16(), message))
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(ComposeError::transport(format!(
                    "unexpected status {status}: {message}"
                )))
            }
        }
    }

    async fn poll(&self, id: Uuid) -> ComposeResult<ComposeStatus> {
        let response = self.client.get(self.status_url(id)).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(ComposeError::transport(format!(
                "status poll for {id} returned {status}: {message}"
            )));
        }

        let body: ComposeStatusResponse = response.json().await?;
        Ok(body.status)
    }
}
