//! # Build Status and Conditions
//!
//! The mutable half of an [`crate::model::ImageBuild`]: per-phase compose
//! job handles and the append-only condition trail. Conditions are the only
//! externally visible audit record of the pipeline: they are never removed
//! or reordered, only appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::condition_kinds;

/// Mutable status of a build generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStatus {
    /// Compose job handle for the container phase, present while the job is
    /// live (submitted and not yet resolved)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_compose_id: Option<Uuid>,
    /// Compose job handle for the installer phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_compose_id: Option<Uuid>,
    /// Append-only observation trail
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl BuildStatus {
    /// Latest condition drawn from the given kinds, scanning newest-first
    pub fn latest_of(&self, kinds: &[ConditionKind]) -> Option<ConditionKind> {
        self.conditions
            .iter()
            .rev()
            .map(|c| c.kind)
            .find(|k| kinds.contains(k))
    }

    /// Kind of the most recently appended condition, regardless of phase
    pub fn latest_kind(&self) -> Option<ConditionKind> {
        self.conditions.last().map(|c| c.kind)
    }

    /// Whether the trail contains the given kind anywhere
    pub fn has(&self, kind: ConditionKind) -> bool {
        self.conditions.iter().any(|c| c.kind == kind)
    }
}

/// A single phase-level observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl Condition {
    pub fn new(kind: ConditionKind, message: Option<String>) -> Self {
        Self {
            kind,
            message,
            observed_at: Utc::now(),
        }
    }
}

/// Closed set of condition kinds, three per pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Container compose job submitted and running
    #[serde(rename = "startedContainerBuild")]
    StartedContainerBuild,
    /// Container compose job finished successfully
    #[serde(rename = "containerBuildDone")]
    ContainerBuildDone,
    /// Container build failed: submission refused, unreachable service at
    /// submission time, or the job itself failed
    #[serde(rename = "failedContainerBuild")]
    FailedContainerBuild,
    /// Installer compose job submitted and running
    #[serde(rename = "startedIsoBuild")]
    StartedIsoBuild,
    /// Installer compose job finished successfully
    #[serde(rename = "isoBuildDone")]
    IsoBuildDone,
    /// Installer build failed
    #[serde(rename = "failedIsoBuild")]
    FailedIsoBuild,
}

impl ConditionKind {
    /// Whether this kind resolves its phase (no further observations of the
    /// phase are expected without outside intervention)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ContainerBuildDone
                | Self::FailedContainerBuild
                | Self::IsoBuildDone
                | Self::FailedIsoBuild
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FailedContainerBuild | Self::FailedIsoBuild)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::ContainerBuildDone | Self::IsoBuildDone)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StartedContainerBuild => condition_kinds::STARTED_CONTAINER_BUILD,
            Self::ContainerBuildDone => condition_kinds::CONTAINER_BUILD_DONE,
            Self::FailedContainerBuild => condition_kinds::FAILED_CONTAINER_BUILD,
            Self::StartedIsoBuild => condition_kinds::STARTED_ISO_BUILD,
            Self::IsoBuildDone => condition_kinds::ISO_BUILD_DONE,
            Self::FailedIsoBuild => condition_kinds::FAILED_ISO_BUILD,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ConditionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            condition_kinds::STARTED_CONTAINER_BUILD => Ok(Self::StartedContainerBuild),
            condition_kinds::CONTAINER_BUILD_DONE => Ok(Self::ContainerBuildDone),
            condition_kinds::FAILED_CONTAINER_BUILD => Ok(Self::FailedContainerBuild),
            condition_kinds::STARTED_ISO_BUILD => Ok(Self::StartedIsoBuild),
            condition_kinds::ISO_BUILD_DONE => Ok(Self::IsoBuildDone),
            condition_kinds::FAILED_ISO_BUILD => Ok(Self::FailedIsoBuild),
            _ => Err(format!("Invalid condition kind: {s}")),
        }
    }
}
