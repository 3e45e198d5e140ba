//! # Reconciliation Controller
//!
//! The level-triggered state machine driving the two-phase image pipeline.
//!
//! ## Overview
//!
//! One invocation performs exactly one step: read the persisted build,
//! derive the pipeline position from job-id presence and the condition
//! trail, take at most one compose-service action per phase, patch the
//! status, and return a scheduling [`Directive`]. The controller never
//! blocks waiting for an external build; long waits come back to the
//! driver as retry-after directives.
//!
//! ## State derivation
//!
//! ```text
//! NoContainerJob → ContainerSubmitted ─┬→ ContainerDone ─[installer?]─┐
//!                                      └→ ContainerFailed             │
//!                  IsoSubmitted ─┬→ IsoDone                ←──────────┘
//!                                └→ IsoFailed
//! ```
//!
//! Nothing is remembered between invocations; a crashed step is repaired by
//! re-deriving the same decision from what was durably recorded. The
//! container phase is always evaluated before the installer phase, and the
//! installer submits only once the container phase reads as complete.
//!
//! ## Error classification
//!
//! | Failure | Condition recorded | Directive |
//! |---|---|---|
//! | read/patch transient, poll transport, deadline | none | `RetrySoon` |
//! | patch version conflict | none (step re-runs) | `RetrySoon` |
//! | submit transport | `failed*Build` ("failed to submit…") | `RetryAfter(long)` |
//! | submit rejected / malformed spec | `failed*Build` with cause | `Fatal` |
//! | job reported failed | `failed*Build` | `Done` (settled) |

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::composer::{ComposeService, ComposeStatus};
use crate::constants::{FAILED_TO_SUBMIT_MSG, RECONCILE_DEADLINE, REQUEUE_LONG};
use crate::model::ImageBuild;
use crate::reconciler::directive::Directive;
use crate::reconciler::phase::{BuildPhase, PhaseProgress};
use crate::reconciler::projector::{PhaseEvent, StatusProjector};
use crate::reconciler::translator;
use crate::store::{BuildStore, ResourceVersion};

/// The reconciliation state machine over one build resource
pub struct BuildReconciler<S, C> {
    store: Arc<S>,
    composer: Arc<C>,
    projector: StatusProjector<S>,
    upload_region: String,
    step_deadline: Duration,
}

/// Working state of one reconcile step: the build as read, tracked through
/// the patches this step applies
struct StepCtx<'a> {
    name: &'a str,
    build: ImageBuild,
    version: ResourceVersion,
}

/// Outcome of evaluating one phase within a step
enum PhaseOutcome {
    /// The phase is complete; evaluation may move to the next phase
    Advanced,
    /// The step ends here with the given directive
    Suspend(Directive),
}

impl<S, C> BuildReconciler<S, C>
where
    S: BuildStore,
    C: ComposeService,
{
    pub fn new(store: Arc<S>, composer: Arc<C>, upload_region: impl Into<String>) -> Self {
        Self {
            projector: StatusProjector::new(store.clone()),
            store,
            composer,
            upload_region: upload_region.into(),
            step_deadline: RECONCILE_DEADLINE,
        }
    }

    /// Override the per-step wall-clock budget
    pub fn with_step_deadline(mut self, deadline: Duration) -> Self {
        self.step_deadline = deadline;
        self
    }

    /// Run one reconcile step with the default deadline
    pub async fn reconcile(&self, name: &str) -> Directive {
        self.reconcile_with_deadline(name, Instant::now() + self.step_deadline)
            .await
    }

    /// Run one reconcile step; every external call is bounded by `deadline`.
    /// An expired deadline surfaces as `RetrySoon`: state is either
    /// committed or untouched, never half-applied.
    pub async fn reconcile_with_deadline(&self, name: &str, deadline: Instant) -> Directive {
        let read = match timeout_at(deadline, self.store.read(name)).await {
            Err(_) => {
                warn!(build = name, "deadline exceeded reading build");
                return Directive::RetrySoon;
            }
            Ok(Err(e)) if e.is_not_found() => {
                // The resource vanished; cleanup is owned by the hosting
                // layer through ownership references.
                info!(build = name, "build no longer exists, nothing to do");
                return Directive::Done;
            }
            Ok(Err(e)) => {
                warn!(build = name, error = %e, "transient failure reading build");
                return Directive::RetrySoon;
            }
            Ok(Ok(versioned)) => versioned,
        };

        let mut ctx = StepCtx {
            name,
            build: read.resource,
            version: read.version,
        };

        if ctx.build.deletion_requested {
            info!(build = name, "build marked for deletion, skipping");
            return Directive::Done;
        }

        match self.run_phase(&mut ctx, BuildPhase::Container, deadline).await {
            PhaseOutcome::Suspend(directive) => directive,
            PhaseOutcome::Advanced => {
                if !ctx.build.spec.target.kind.requires_installer() {
                    return Directive::Done;
                }
                match self.run_phase(&mut ctx, BuildPhase::Iso, deadline).await {
                    PhaseOutcome::Suspend(directive) => directive,
                    PhaseOutcome::Advanced => Directive::Done,
                }
            }
        }
    }

    async fn run_phase(
        &self,
        ctx: &mut StepCtx<'_>,
        phase: BuildPhase,
        deadline: Instant,
    ) -> PhaseOutcome {
        match phase.progress(&ctx.build.status) {
            PhaseProgress::Succeeded => PhaseOutcome::Advanced,
            PhaseProgress::JobFailed => {
                // Terminal and stable: the failure is already on record and
                // a failed job will not succeed on its own.
                PhaseOutcome::Suspend(Directive::Done)
            }
            PhaseProgress::Running(id) => self.poll_job(ctx, phase, id, deadline).await,
            PhaseProgress::Unstarted | PhaseProgress::SubmissionFailed => {
                self.submit_job(ctx, phase, deadline).await
            }
        }
    }

    async fn poll_job(
        &self,
        ctx: &mut StepCtx<'_>,
        phase: BuildPhase,
        id: Uuid,
        deadline: Instant,
    ) -> PhaseOutcome {
        let status = match timeout_at(deadline, self.composer.poll(id)).await {
            Err(_) => {
                warn!(build = ctx.name, phase = %phase, compose_id = %id, "deadline exceeded polling job");
                return PhaseOutcome::Suspend(Directive::RetrySoon);
            }
            Ok(Err(e)) => {
                // Transient infrastructure trouble; no condition recorded.
                warn!(build = ctx.name, phase = %phase, compose_id = %id, error = %e, "status poll failed");
                return PhaseOutcome::Suspend(Directive::RetrySoon);
            }
            Ok(Ok(status)) => status,
        };

        match status {
            ComposeStatus::Pending => {
                match self
                    .record(ctx, phase, PhaseEvent::StillRunning, deadline)
                    .await
                {
                    Ok(()) => PhaseOutcome::Suspend(Directive::RetryAfter(REQUEUE_LONG)),
                    Err(directive) => PhaseOutcome::Suspend(directive),
                }
            }
            ComposeStatus::Success => {
                match self.record(ctx, phase, PhaseEvent::Succeeded, deadline).await {
                    Ok(()) => {
                        info!(build = ctx.name, phase = %phase, compose_id = %id, "compose job finished");
                        PhaseOutcome::Advanced
                    }
                    Err(directive) => PhaseOutcome::Suspend(directive),
                }
            }
            ComposeStatus::Failure => {
                let event = PhaseEvent::JobFailed {
                    message: "compose job failed".to_string(),
                };
                match self.record(ctx, phase, event, deadline).await {
                    Ok(()) => {
                        warn!(build = ctx.name, phase = %phase, compose_id = %id, "compose job failed");
                        PhaseOutcome::Suspend(Directive::Done)
                    }
                    Err(directive) => PhaseOutcome::Suspend(directive),
                }
            }
        }
    }

    async fn submit_job(
        &self,
        ctx: &mut StepCtx<'_>,
        phase: BuildPhase,
        deadline: Instant,
    ) -> PhaseOutcome {
        let request = match translator::translate(&ctx.build.spec, phase, &self.upload_region) {
            Ok(request) => request,
            Err(e) => {
                // Malformed declarative input: report, never retry.
                let message = e.to_string();
                warn!(build = ctx.name, phase = %phase, error = %message, "build spec cannot be translated");
                let event = PhaseEvent::SubmitFailed {
                    message: message.clone(),
                };
                return match self.record(ctx, phase, event, deadline).await {
                    Ok(()) => PhaseOutcome::Suspend(Directive::Fatal(message)),
                    Err(directive) => PhaseOutcome::Suspend(directive),
                };
            }
        };

        match timeout_at(deadline, self.composer.submit(&request)).await {
            Err(_) => {
                // Canceled with the submission outcome unknown; the job-id
                // guard makes the next step safe to re-run.
                warn!(build = ctx.name, phase = %phase, "deadline exceeded submitting job");
                PhaseOutcome::Suspend(Directive::RetrySoon)
            }
            Ok(Ok(id)) => {
                info!(build = ctx.name, phase = %phase, compose_id = %id, "compose job submitted");
                match self.record(ctx, phase, PhaseEvent::Submitted(id), deadline).await {
                    Ok(()) => PhaseOutcome::Suspend(Directive::RetrySoon),
                    Err(directive) => {
                        warn!(
                            build = ctx.name,
                            phase = %phase,
                            compose_id = %id,
                            "job handle not persisted; the build may be submitted again"
                        );
                        PhaseOutcome::Suspend(directive)
                    }
                }
            }
            Ok(Err(e)) if e.is_rejection() => {
                let message = e.to_string();
                warn!(build = ctx.name, phase = %phase, error = %message, "compose request rejected");
                let event = PhaseEvent::SubmitFailed {
                    message: message.clone(),
                };
                match self.record(ctx, phase, event, deadline).await {
                    Ok(()) => PhaseOutcome::Suspend(Directive::Fatal(message)),
                    Err(directive) => PhaseOutcome::Suspend(directive),
                }
            }
            Ok(Err(e)) => {
                // The service could not be reached; back off rather than
                // hot-looping against it. The job id was never set, so the
                // guard allows a fresh submission on the next step.
                warn!(build = ctx.name, phase = %phase, error = %e, "compose submission failed");
                let event = PhaseEvent::SubmitFailed {
                    message: FAILED_TO_SUBMIT_MSG.to_string(),
                };
                match self.record(ctx, phase, event, deadline).await {
                    Ok(()) => PhaseOutcome::Suspend(Directive::RetryAfter(REQUEUE_LONG)),
                    Err(directive) => PhaseOutcome::Suspend(directive),
                }
            }
        }
    }

    /// Apply an observation through the projector, folding the patched
    /// status back into the step context. Store trouble of any shape maps
    /// to a short retry of the whole step.
    async fn record(
        &self,
        ctx: &mut StepCtx<'_>,
        phase: BuildPhase,
        event: PhaseEvent,
        deadline: Instant,
    ) -> Result<(), Directive> {
        let outcome = timeout_at(
            deadline,
            self.projector
                .record(ctx.name, ctx.version, &ctx.build.status, phase, &event),
        )
        .await;

        match outcome {
            Err(_) => {
                warn!(build = ctx.name, phase = %phase, "deadline exceeded patching status");
                Err(Directive::RetrySoon)
            }
            Ok(Err(e)) if e.is_conflict() => {
                // Someone else patched between our read and write; the next
                // step re-reads and re-derives rather than reapplying a
                // stale mutation.
                warn!(build = ctx.name, phase = %phase, error = %e, "status patch conflicted");
                Err(Directive::RetrySoon)
            }
            Ok(Err(e)) => {
                warn!(build = ctx.name, phase = %phase, error = %e, "status patch failed");
                Err(Directive::RetrySoon)
            }
            Ok(Ok(None)) => Ok(()),
            Ok(Ok(Some((status, version)))) => {
                ctx.build.status = status;
                ctx.version = version;
                Ok(())
            }
        }
    }
}

// Scenario-level behavior of the controller is exercised end-to-end in
// `tests/reconcile_scenarios.rs` against the in-memory store and a scripted
// compose service.
