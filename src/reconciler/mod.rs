// Reconciliation core: the state machine and its collaborators.
//
// `controller` owns the step logic, `projector` owns status mutation and
// the optimistic patch, `translator` maps specs to wire requests, and
// `directive` carries the scheduling decision back to the driver.

pub mod controller;
pub mod directive;
pub mod phase;
pub mod projector;
pub mod translator;

// Re-export main types for convenient access
pub use controller::BuildReconciler;
pub use directive::Directive;
pub use phase::{BuildPhase, PhaseProgress};
pub use projector::{PhaseEvent, StatusProjector};
pub use translator::{translate, TranslateError};
