//! # Status Projector
//!
//! Translates a phase-level observation into the one status mutation it
//! implies (job-id bookkeeping plus at most one appended condition) and
//! applies it through the persistence boundary under the version token the
//! controller read. The projection is a pure snapshot-mutate-diff; if the
//! observation changes nothing (a poll that still reports pending), no
//! patch is issued at all.
//!
//! A consecutive duplicate of a phase's latest condition kind is suppressed,
//! which is what keeps repeated pending polls from growing the trail and
//! keeps submission idempotent in the audit record.

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::model::{BuildStatus, Condition};
use crate::reconciler::phase::BuildPhase;
use crate::store::{BuildStore, ResourceVersion, StoreResult};

/// A phase-level observation made by the controller during one step
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseEvent {
    /// The compose service accepted a submission and returned a job handle
    Submitted(Uuid),
    /// The submission could not be completed; no job exists
    SubmitFailed { message: String },
    /// A poll reported the job still pending
    StillRunning,
    /// A poll reported the job finished successfully
    Succeeded,
    /// A poll reported the job failed
    JobFailed { message: String },
}

/// Applies observations to persisted status with optimistic concurrency
pub struct StatusProjector<S> {
    store: Arc<S>,
}

impl<S> StatusProjector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Project an observation onto a status snapshot.
    ///
    /// Returns the mutated copy, or `None` when the observation implies no
    /// change (so the caller can skip the patch entirely).
    pub fn project(
        status: &BuildStatus,
        phase: BuildPhase,
        event: &PhaseEvent,
    ) -> Option<BuildStatus> {
        let mut next = status.clone();

        let (job_id, condition_kind, message) = match event {
            PhaseEvent::Submitted(id) => (Some(*id), phase.started_kind(), None),
            PhaseEvent::SubmitFailed { message } => {
                (None, phase.failed_kind(), Some(message.clone()))
            }
            PhaseEvent::StillRunning => (phase.job_id(status), phase.started_kind(), None),
            PhaseEvent::Succeeded => (None, phase.done_kind(), None),
            PhaseEvent::JobFailed { message } => (None, phase.failed_kind(), Some(message.clone())),
        };

        match phase {
            BuildPhase::Container => next.container_compose_id = job_id,
            BuildPhase::Iso => next.iso_compose_id = job_id,
        }

        // Append-only with consecutive-duplicate suppression per phase.
        if status.latest_of(&phase.kinds()) != Some(condition_kind) {
            next.conditions.push(Condition::new(condition_kind, message));
        }

        if next == *status {
            None
        } else {
            Some(next)
        }
    }
}

impl<S: BuildStore> StatusProjector<S> {
    /// Project and, if anything changed, patch the stored status under the
    /// given version token. Returns the patched status and its new token,
    /// or `None` for a no-op observation.
    pub async fn record(
        &self,
        name: &str,
        version: ResourceVersion,
        status: &BuildStatus,
        phase: BuildPhase,
        event: &PhaseEvent,
    ) -> StoreResult<Option<(BuildStatus, ResourceVersion)>> {
        let Some(next) = Self::project(status, phase, event) else {
            debug!(build = name, phase = %phase, "observation changed nothing, skipping patch");
            return Ok(None);
        };

        let new_version = self.store.patch_status(name, version, &next).await?;
        Ok(Some((next, new_version)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConditionKind;
    use crate::store::{InMemoryStore, StoreError};

    type Projector = StatusProjector<InMemoryStore>;

    #[test]
    fn test_submitted_sets_id_and_appends_started() {
        let status = BuildStatus::default();
        let id = Uuid::new_v4();

        let next =
            Projector::project(&status, BuildPhase::Container, &PhaseEvent::Submitted(id)).unwrap();

        assert_eq!(next.container_compose_id, Some(id));
        assert_eq!(next.conditions.len(), 1);
        assert_eq!(
            next.conditions[0].kind,
            ConditionKind::StartedContainerBuild
        );
    }

    #[test]
    fn test_still_running_is_a_no_op() {
        let id = Uuid::new_v4();
        let status = Projector::project(
            &BuildStatus::default(),
            BuildPhase::Container,
            &PhaseEvent::Submitted(id),
        )
        .unwrap();

        // Polling a pending job observes what is already recorded.
        assert!(
            Projector::project(&status, BuildPhase::Container, &PhaseEvent::StillRunning).is_none()
        );
    }

    #[test]
    fn test_succeeded_clears_id_and_appends_done() {
        let id = Uuid::new_v4();
        let status = Projector::project(
            &BuildStatus::default(),
            BuildPhase::Container,
            &PhaseEvent::Submitted(id),
        )
        .unwrap();

        let next =
            Projector::project(&status, BuildPhase::Container, &PhaseEvent::Succeeded).unwrap();
        assert_eq!(next.container_compose_id, None);
        assert_eq!(
            next.conditions.last().unwrap().kind,
            ConditionKind::ContainerBuildDone
        );
        // The started condition is still there: the trail is append-only.
        assert_eq!(
            next.conditions[0].kind,
            ConditionKind::StartedContainerBuild
        );
    }

    #[test]
    fn test_job_failed_clears_id_and_carries_message() {
        let id = Uuid::new_v4();
        let status = Projector::project(
            &BuildStatus::default(),
            BuildPhase::Iso,
            &PhaseEvent::Submitted(id),
        )
        .unwrap();

        let next = Projector::project(
            &status,
            BuildPhase::Iso,
            &PhaseEvent::JobFailed {
                message: "compose job failed".to_string(),
            },
        )
        .unwrap();
        assert_eq!(next.iso_compose_id, None);
        let last = next.conditions.last().unwrap();
        assert_eq!(last.kind, ConditionKind::FailedIsoBuild);
        assert_eq!(last.message.as_deref(), Some("compose job failed"));
    }

    #[test]
    fn test_projection_never_touches_other_phase() {
        let container_id = Uuid::new_v4();
        let status = Projector::project(
            &BuildStatus::default(),
            BuildPhase::Container,
            &PhaseEvent::Submitted(container_id),
        )
        .unwrap();

        let next = Projector::project(
            &status,
            BuildPhase::Iso,
            &PhaseEvent::Submitted(Uuid::new_v4()),
        )
        .unwrap();
        assert_eq!(next.container_compose_id, Some(container_id));
    }

    #[tokio::test]
    async fn test_record_surfaces_conflict() {
        use crate::model::{BuildSpec, ImageBuild, ImageKind, TargetImage, TriggeredBy};

        let store = Arc::new(InMemoryStore::new());
        store
            .create(ImageBuild::new(
                "b-1",
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
            ))
            .await
            .unwrap();

        let projector = StatusProjector::new(store.clone());
        let read = store.read("b-1").await.unwrap();

        // Another writer bumps the version between read and patch.
        store
            .patch_status("b-1", read.version, &read.resource.status)
            .await
            .unwrap();

        let err = projector
            .record(
                "b-1",
                read.version,
                &read.resource.status,
                BuildPhase::Container,
                &PhaseEvent::Submitted(Uuid::new_v4()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }
}
