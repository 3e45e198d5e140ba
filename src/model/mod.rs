// Domain model for the build orchestration core.
//
// The resource pair at the heart of reconciliation is an immutable build
// specification and a mutable status document carrying the append-only
// condition trail.

pub mod build;
pub mod customizations;
pub mod status;

// Re-export main types for convenient access
pub use build::{
    BuildConfig, BuildConfigStatus, BuildSpec, BuildTemplate, ImageBuild, ImageKind, NameRef,
    OsTreeConfig, TargetImage, TriggeredBy, WebhookTrigger,
};
pub use customizations::{merge_customizations, Customizations, Services, User};
pub use status::{BuildStatus, Condition, ConditionKind};
