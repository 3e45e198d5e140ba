//! # Pipeline Phases
//!
//! The two stages of the image pipeline and the derivation of a phase's
//! progress from persisted state alone. Reconciliation is level-triggered:
//! nothing here remembers what a previous invocation did; job-id presence
//! and the condition trail are the whole truth.

use std::fmt;
use uuid::Uuid;

use crate::constants::image_types;
use crate::model::{BuildStatus, ConditionKind};

/// One stage of the two-phase pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Base container image
    Container,
    /// Bootable installer image, assembled after a successful container
    Iso,
}

impl BuildPhase {
    /// Condition recorded when this phase's job is submitted/running
    pub fn started_kind(&self) -> ConditionKind {
        match self {
            Self::Container => ConditionKind::StartedContainerBuild,
            Self::Iso => ConditionKind::StartedIsoBuild,
        }
    }

    /// Condition recorded when this phase's job succeeds
    pub fn done_kind(&self) -> ConditionKind {
        match self {
            Self::Container => ConditionKind::ContainerBuildDone,
            Self::Iso => ConditionKind::IsoBuildDone,
        }
    }

    /// Condition recorded when this phase fails
    pub fn failed_kind(&self) -> ConditionKind {
        match self {
            Self::Container => ConditionKind::FailedContainerBuild,
            Self::Iso => ConditionKind::FailedIsoBuild,
        }
    }

    /// All condition kinds belonging to this phase
    pub fn kinds(&self) -> [ConditionKind; 3] {
        [self.started_kind(), self.done_kind(), self.failed_kind()]
    }

    /// The image type this phase requests from the compose service
    pub fn image_type(&self) -> &'static str {
        match self {
            Self::Container => image_types::EDGE_CONTAINER,
            Self::Iso => image_types::EDGE_INSTALLER,
        }
    }

    /// The live compose job handle stored for this phase, if any
    pub fn job_id(&self, status: &BuildStatus) -> Option<Uuid> {
        match self {
            Self::Container => status.container_compose_id,
            Self::Iso => status.iso_compose_id,
        }
    }

    /// Derive this phase's progress from persisted state.
    ///
    /// The one subtlety is telling the two failure shapes apart with the
    /// job id absent in both: a recorded `started*Build` means a submission
    /// once succeeded, so the failure came from the job itself and the phase
    /// is settled; without it the failure happened at submission time and a
    /// fresh submit attempt is allowed.
    pub fn progress(&self, status: &BuildStatus) -> PhaseProgress {
        if let Some(id) = self.job_id(status) {
            return PhaseProgress::Running(id);
        }

        match status.latest_of(&self.kinds()) {
            None => PhaseProgress::Unstarted,
            Some(kind) if kind == self.done_kind() => PhaseProgress::Succeeded,
            Some(kind) if kind == self.failed_kind() => {
                if status.has(self.started_kind()) {
                    PhaseProgress::JobFailed
                } else {
                    PhaseProgress::SubmissionFailed
                }
            }
            // A started condition without a stored job id should not occur;
            // resubmitting is the self-healing interpretation.
            Some(_) => PhaseProgress::Unstarted,
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Iso => write!(f, "installer"),
        }
    }
}

/// Progress of one phase, derived purely from persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseProgress {
    /// Nothing submitted yet
    Unstarted,
    /// A compose job is live and should be polled
    Running(Uuid),
    /// The phase completed successfully
    Succeeded,
    /// A submission attempt failed before a job existed; eligible for a
    /// fresh submit
    SubmissionFailed,
    /// The compose job itself failed; terminal for the pipeline
    JobFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Condition;

    fn status_with(kinds: &[ConditionKind]) -> BuildStatus {
        let mut status = BuildStatus::default();
        for kind in kinds {
            status.conditions.push(Condition::new(*kind, None));
        }
        status
    }

    #[test]
    fn test_progress_unstarted() {
        let status = BuildStatus::default();
        assert_eq!(
            BuildPhase::Container.progress(&status),
            PhaseProgress::Unstarted
        );
        assert_eq!(BuildPhase::Iso.progress(&status), PhaseProgress::Unstarted);
    }

    #[test]
    fn test_progress_running_while_job_id_present() {
        let mut status = status_with(&[ConditionKind::StartedContainerBuild]);
        let id = Uuid::new_v4();
        status.container_compose_id = Some(id);
        assert_eq!(
            BuildPhase::Container.progress(&status),
            PhaseProgress::Running(id)
        );
        // The installer phase is untouched by a running container job.
        assert_eq!(BuildPhase::Iso.progress(&status), PhaseProgress::Unstarted);
    }

    #[test]
    fn test_progress_succeeded() {
        let status = status_with(&[
            ConditionKind::StartedContainerBuild,
            ConditionKind::ContainerBuildDone,
        ]);
        assert_eq!(
            BuildPhase::Container.progress(&status),
            PhaseProgress::Succeeded
        );
    }

    #[test]
    fn test_failure_discrimination() {
        // Failed without ever starting: the submission itself failed and a
        // fresh attempt is allowed.
        let status = status_with(&[ConditionKind::FailedContainerBuild]);
        assert_eq!(
            BuildPhase::Container.progress(&status),
            PhaseProgress::SubmissionFailed
        );

        // Failed after a successful start: the job failed, phase settled.
        let status = status_with(&[
            ConditionKind::StartedContainerBuild,
            ConditionKind::FailedContainerBuild,
        ]);
        assert_eq!(
            BuildPhase::Container.progress(&status),
            PhaseProgress::JobFailed
        );
    }

    #[test]
    fn test_phase_kind_mapping() {
        assert_eq!(
            BuildPhase::Container.done_kind(),
            ConditionKind::ContainerBuildDone
        );
        assert_eq!(BuildPhase::Iso.failed_kind(), ConditionKind::FailedIsoBuild);
        assert_eq!(BuildPhase::Container.image_type(), "edge-container");
        assert_eq!(BuildPhase::Iso.image_type(), "edge-installer");
    }
}
