//! Build orchestration daemon: wires the reconciler to a store and a
//! compose service, serves the webhook trigger, and owns the requeue clock
//! that the core's directives delegate to.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

use osforge_core::composer::HttpComposeClient;
use osforge_core::logging::init_structured_logging;
use osforge_core::reconciler::BuildReconciler;
use osforge_core::store::InMemoryStore;
use osforge_core::trigger::{router, BuildCreator, WebhookState};
use osforge_core::ForgeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let config = ForgeConfig::from_env().context("loading configuration")?;
    info!(composer_url = %config.composer_url, "starting build orchestration daemon");

    let store = Arc::new(InMemoryStore::new());
    let composer = Arc::new(
        HttpComposeClient::new(
            &config.composer_url,
            Duration::from_secs(config.composer_timeout_secs),
        )
        .context("building compose client")?,
    );

    let reconciler = BuildReconciler::new(store.clone(), composer, config.upload_region.clone())
        .with_step_deadline(Duration::from_secs(config.reconcile_deadline_secs));

    let (notify_tx, notify_rx) = mpsc::unbounded_channel();

    let webhook_state = Arc::new(WebhookState {
        store: store.clone(),
        creator: BuildCreator::new(store.clone()),
        notify: Some(notify_tx),
    });

    let listener = tokio::net::TcpListener::bind(&config.webhook_bind_addr)
        .await
        .with_context(|| format!("binding webhook server to {}", config.webhook_bind_addr))?;
    info!(addr = %config.webhook_bind_addr, "webhook trigger server listening");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(webhook_state)).await {
            warn!(error = %e, "webhook server terminated");
        }
    });

    drive_reconciles(reconciler, notify_rx).await;
    Ok(())
}

/// The external-scheduler half of the contract: builds enter through the
/// notification channel, reconcile at their due time, and re-enter the
/// queue according to the directive each step returns.
async fn drive_reconciles<S, C>(
    reconciler: BuildReconciler<S, C>,
    mut notify_rx: mpsc::UnboundedReceiver<String>,
) where
    S: osforge_core::store::BuildStore,
    C: osforge_core::composer::ComposeService,
{
    let mut queue: BinaryHeap<Reverse<(Instant, String)>> = BinaryHeap::new();

    loop {
        let next_due = queue.peek().map(|Reverse((due, _))| *due);

        tokio::select! {
            notified = notify_rx.recv() => {
                match notified {
                    Some(name) => {
                        info!(build = %name, "scheduling first reconcile");
                        queue.push(Reverse((Instant::now(), name)));
                    }
                    None => {
                        info!("trigger channel closed, stopping driver");
                        return;
                    }
                }
            }
            // Sleep until the earliest queued build is due; park forever
            // while the queue is empty.
            _ = async {
                match next_due {
                    Some(due) => sleep_until(due).await,
                    None => std::future::pending().await,
                }
            } => {
                let Some(Reverse((_, name))) = queue.pop() else { continue };
                let directive = reconciler.reconcile(&name).await;
                match directive.requeue_delay() {
                    Some(delay) => {
                        queue.push(Reverse((Instant::now() + delay, name)));
                    }
                    None => {
                        info!(build = %name, ?directive, "build settled");
                    }
                }
            }
        }
    }
}
