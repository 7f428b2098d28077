// ABOUTME: Fatal lifecycle errors with SNAFU context selectors.
// ABOUTME: Separates transport, timeout, resource-phase and verification failures.

use snafu::Snafu;

use crate::ledger::LedgerError;
use crate::platform::PlatformError;

/// Every way a probe run can end other than success.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LifecycleError {
    #[snafu(display("checking namespace {namespace} failed: {source}"))]
    NamespaceCheck {
        namespace: String,
        source: PlatformError,
    },

    #[snafu(display("deleting namespace {namespace} failed: {source}"))]
    NamespaceDelete {
        namespace: String,
        source: PlatformError,
    },

    #[snafu(display(
        "Deleting namespace failed: {namespace} still present after {iterations} checks"
    ))]
    NamespaceDeleteTimeout { namespace: String, iterations: u32 },

    #[snafu(display("creating namespace {namespace} failed: {source}"))]
    NamespaceCreate {
        namespace: String,
        source: PlatformError,
    },

    #[snafu(display(
        "Failed to create project {namespace} after {attempts} conflicting attempts. \
         Check if the previous namespace has been removed and the permissions of the service account."
    ))]
    NamespaceCreateConflict { namespace: String, attempts: u32 },

    #[snafu(display("attempt ledger failure: {source}"))]
    Ledger { source: LedgerError },

    #[snafu(display("cleanup failed at {step}: {source}"))]
    Cleanup {
        step: &'static str,
        source: PlatformError,
    },

    #[snafu(display("creating {step} failed: {source}"))]
    Provision {
        step: &'static str,
        source: PlatformError,
    },

    #[snafu(display("starting build from {build_config} failed: {source}"))]
    BuildTrigger {
        build_config: String,
        source: PlatformError,
    },

    #[snafu(display("Error while building image: build pod {pod} is in phase {phase}"))]
    BuildFailed { pod: String, phase: String },

    #[snafu(display("Build took too long! Not finished after {iterations} checks"))]
    BuildTimeout { iterations: u32 },

    #[snafu(display("creating route for {host} failed: {source}"))]
    Route { host: String, source: PlatformError },

    #[snafu(display("starting deployment of {deployment_config} failed: {source}"))]
    DeployTrigger {
        deployment_config: String,
        source: PlatformError,
    },

    #[snafu(display("Can't find application pod after {iterations} checks"))]
    AppPodNotFound { iterations: u32 },

    #[snafu(display("application pod {pod} is in phase {phase}"))]
    PodFailed { pod: String, phase: String },

    #[snafu(display("application pod {pod} not running after {iterations} checks"))]
    PodStartTimeout { pod: String, iterations: u32 },

    #[snafu(display("Webpage request to {host} failed after {attempts} tries!"))]
    VerificationFailed { host: String, attempts: u32 },

    #[snafu(display(
        "This run was successful, but took {elapsed_secs}s, longer than the {threshold_secs}s budget!"
    ))]
    SlowRun {
        elapsed_secs: u64,
        threshold_secs: u64,
    },

    #[snafu(display("platform request failed: {source}"))]
    Platform { source: PlatformError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleErrorKind {
    /// The platform API rejected a call or could not be reached.
    Transport,
    /// A bounded wait ran out of iterations.
    Timeout,
    /// A build or application pod reached an error phase.
    ResourcePhase,
    /// Namespace creation kept conflicting.
    Conflict,
    /// The attempt ledger could not be maintained.
    Ledger,
    /// The application never answered with 200.
    Verification,
    /// Everything worked, but slower than the budget.
    SlowRun,
}

impl LifecycleError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> LifecycleErrorKind {
        match self {
            LifecycleError::NamespaceCheck { .. }
            | LifecycleError::NamespaceDelete { .. }
            | LifecycleError::NamespaceCreate { .. }
            | LifecycleError::Cleanup { .. }
            | LifecycleError::Provision { .. }
            | LifecycleError::BuildTrigger { .. }
            | LifecycleError::Route { .. }
            | LifecycleError::DeployTrigger { .. }
            | LifecycleError::Platform { .. } => LifecycleErrorKind::Transport,
            LifecycleError::NamespaceDeleteTimeout { .. }
            | LifecycleError::BuildTimeout { .. }
            | LifecycleError::AppPodNotFound { .. }
            | LifecycleError::PodStartTimeout { .. } => LifecycleErrorKind::Timeout,
            LifecycleError::BuildFailed { .. } | LifecycleError::PodFailed { .. } => {
                LifecycleErrorKind::ResourcePhase
            }
            LifecycleError::NamespaceCreateConflict { .. } => LifecycleErrorKind::Conflict,
            LifecycleError::Ledger { .. } => LifecycleErrorKind::Ledger,
            LifecycleError::VerificationFailed { .. } => LifecycleErrorKind::Verification,
            LifecycleError::SlowRun { .. } => LifecycleErrorKind::SlowRun,
        }
    }

    /// Whether this error came from a bounded wait running out.
    pub fn is_timeout(&self) -> bool {
        self.kind() == LifecycleErrorKind::Timeout
    }
}
