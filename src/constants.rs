//! # System Constants
//!
//! Core constants that define the operational boundaries of the build
//! orchestration core: condition wire names, requeue intervals, and the
//! image-type names understood by the compose service.
//!
//! Wire names are kept byte-compatible with the published resource schema so
//! that stored status documents remain readable across versions.

use std::time::Duration;

/// Condition kinds as they appear in persisted status documents
pub mod condition_kinds {
    pub const STARTED_CONTAINER_BUILD: &str = "startedContainerBuild";
    pub const CONTAINER_BUILD_DONE: &str = "containerBuildDone";
    pub const FAILED_CONTAINER_BUILD: &str = "failedContainerBuild";

    pub const STARTED_ISO_BUILD: &str = "startedIsoBuild";
    pub const ISO_BUILD_DONE: &str = "isoBuildDone";
    pub const FAILED_ISO_BUILD: &str = "failedIsoBuild";
}

/// Image-type names on the compose service wire
pub mod image_types {
    pub const EDGE_CONTAINER: &str = "edge-container";
    pub const EDGE_INSTALLER: &str = "edge-installer";
}

/// Requeue interval for transient conditions: infrastructure hiccups,
/// freshly submitted jobs that should be polled promptly.
pub const REQUEUE_SHORT: Duration = Duration::from_secs(10);

/// Requeue interval for steady-state waiting: a long-running external job,
/// or backing off from a compose service that refused a connection.
pub const REQUEUE_LONG: Duration = Duration::from_secs(60);

/// Wall-clock budget for a single reconcile invocation. Every external call
/// made during the step is bounded by the remainder of this budget.
pub const RECONCILE_DEADLINE: Duration = Duration::from_secs(30);

/// Message recorded on the failure condition when the compose service could
/// not be reached to submit a build request.
pub const FAILED_TO_SUBMIT_MSG: &str = "failed to submit build request";
