//! # OSForge Core
//!
//! Reconciliation core for operating-system image builds: converts a
//! declarative build request into submissions to an external compose
//! service, tracked through a two-phase pipeline (base container image,
//! optionally followed by a bootable installer image).
//!
//! ## Overview
//!
//! The heart of the crate is a level-triggered state machine. An external
//! driver invokes [`reconciler::BuildReconciler`] once per change
//! notification or timer expiry; each invocation reads the persisted build,
//! performs one step (submit a job, poll a job, advance the phase, or
//! stop), patches the status, and returns a [`reconciler::Directive`]
//! telling the driver when to come back. Long-running external builds are
//! never awaited in-process.
//!
//! ## Module Organization
//!
//! - [`model`] - Build resources, customizations, status and conditions
//! - [`reconciler`] - Controller, status projector, request translator
//! - [`composer`] - Compose service client boundary
//! - [`store`] - Persistence boundary with optimistic concurrency
//! - [`trigger`] - Webhook trigger and build-generation creation
//! - [`config`] - Environment-driven configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-level error types
//!
//! ## Guarantees
//!
//! - At most one live compose job per phase (job-id guard).
//! - The condition trail is append-only and is the sole audit record.
//! - Every status patch is guarded by an optimistic version token; stale
//!   writes are rejected and the step re-runs from a fresh read.
//! - The core holds no timers, no background tasks, and no shared mutable
//!   state across build instances.

pub mod composer;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod model;
pub mod reconciler;
pub mod store;
pub mod trigger;

pub use config::ForgeConfig;
pub use error::{ForgeError, Result};
pub use model::{BuildConfig, BuildSpec, BuildStatus, Condition, ConditionKind, ImageBuild};
pub use reconciler::{BuildReconciler, Directive};
