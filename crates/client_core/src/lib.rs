//! Client side of the cut-to-size glass ordering workflow.
//!
//! [`SessionState`] is the wizard: a five step state machine fed with
//! [`WizardEvent`]s. Remote calls leave it as [`Effect`]s, tagged with a
//! per-class [`RequestToken`], and return as [`Completion`]s; only the latest token
//! of a class is ever applied. [`Workflow`] runs that loop against a
//! [`GlassService`].

pub mod catalog;
pub mod controller;
pub mod error;
pub mod history;
pub mod optimization;
pub mod pdf;
pub mod pricing;
pub mod service;
pub mod session;
pub mod tokens;
pub mod view;
pub mod wizard;
pub mod workflow;

pub use controller::{Completion, Effect, WizardEvent};
pub use error::{OptimizationError, ServiceError, ValidationError};
pub use history::{ClearOutcome, Confirmation};
pub use service::{GlassService, HttpGlassService};
pub use session::{HistoryState, Notice, NoticeLevel, SessionState};
pub use tokens::{RequestKind, RequestToken};
pub use wizard::WizardStep;
pub use workflow::Workflow;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
