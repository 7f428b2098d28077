// ABOUTME: Probe run lifecycle using the type state pattern.
// ABOUTME: Namespace preparation, provisioning, build, deploy, verification.

mod error;
mod namespace;
mod orchestrator;
mod run;
mod settings;
mod state;
pub mod topology;
mod transitions;

pub use error::{LifecycleError, LifecycleErrorKind};
pub use namespace::{ResetDecision, UNREADABLE_ATTEMPTS, reset_decision};
pub use orchestrator::run;
pub use run::{Run, RunReport};
pub use settings::{RunSettings, Timings};
pub use state::{
    Built, Deployed, Initialized, NamespaceOrigin, NamespaceReady, Provisioned, Routed, Running,
    Verified,
};
