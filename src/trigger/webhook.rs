//! # Webhook Trigger Handler
//!
//! The inbound HTTP surface: an authenticated call creates the next build
//! generation for a config. Authentication is a single shared-secret
//! comparison against the secret referenced by the config; everything
//! heavier is out of scope by design.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::model::TriggeredBy;
use crate::store::{BuildConfigStore, BuildStore, SecretStore};
use crate::trigger::{BuildCreator, TriggerError, TriggerResult};

/// Shared state behind the webhook routes
pub struct WebhookState<S> {
    pub store: Arc<S>,
    pub creator: BuildCreator<S>,
    /// Names of freshly created builds are sent here so the driver can
    /// schedule their first reconcile
    pub notify: Option<mpsc::UnboundedSender<String>>,
}

#[derive(Debug, Deserialize)]
struct TriggerParams {
    secret: String,
}

/// Build the webhook router
pub fn router<S>(state: Arc<WebhookState<S>>) -> Router
where
    S: BuildConfigStore + BuildStore + SecretStore + Send + Sync + 'static,
{
    Router::new()
        .route("/v1/build-configs/:name/trigger", post(trigger_build::<S>))
        .with_state(state)
}

async fn trigger_build<S>(
    State(state): State<Arc<WebhookState<S>>>,
    Path(name): Path<String>,
    Query(params): Query<TriggerParams>,
) -> StatusCode
where
    S: BuildConfigStore + BuildStore + SecretStore + Send + Sync + 'static,
{
    info!(config = %name, "build trigger received");

    match handle_trigger(&state, &name, &params.secret).await {
        Ok(build_name) => {
            info!(config = %name, build = %build_name, "build created from webhook");
            if let Some(notify) = &state.notify {
                let _ = notify.send(build_name);
            }
            StatusCode::OK
        }
        Err(e) => {
            warn!(config = %name, error = %e, "build trigger refused");
            status_code_for(&e)
        }
    }
}

async fn handle_trigger<S>(
    state: &WebhookState<S>,
    name: &str,
    caller_secret: &str,
) -> TriggerResult<String>
where
    S: BuildConfigStore + BuildStore + SecretStore,
{
    let config = state.store.read_config(name).await.map_err(|e| {
        if e.is_not_found() {
            TriggerError::ConfigNotFound {
                name: name.to_string(),
            }
        } else {
            TriggerError::Store(e)
        }
    })?;

    let webhook =
        config
            .resource
            .webhook
            .clone()
            .ok_or_else(|| TriggerError::WebhookNotConfigured {
                name: name.to_string(),
            })?;

    let secret = state
        .store
        .read_secret(&webhook.secret_name)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                TriggerError::SecretNotFound {
                    name: webhook.secret_name.clone(),
                }
            } else {
                TriggerError::Store(e)
            }
        })?;

    if secret != caller_secret {
        return Err(TriggerError::Forbidden);
    }

    let build = state
        .creator
        .create_from_config(&config.resource, config.version, TriggeredBy::Webhook)
        .await?;

    Ok(build.name)
}

fn status_code_for(err: &TriggerError) -> StatusCode {
    match err {
        TriggerError::ConfigNotFound { .. } | TriggerError::SecretNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        TriggerError::WebhookNotConfigured { .. } => StatusCode::BAD_REQUEST,
        TriggerError::Forbidden => StatusCode::FORBIDDEN,
        TriggerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
