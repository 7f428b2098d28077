// ABOUTME: Run state types for the type state pattern.
// ABOUTME: Each state carries the data the following transitions depend on.

use crate::types::{BuildName, PodName};

/// How the namespace came to be ready for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceOrigin {
    /// The namespace did not exist and was created.
    Created,
    /// The attempt threshold was reached; the namespace was deleted and recreated.
    Recreated { previous_attempts: u32 },
    /// The namespace was cleaned and reused; the ledger now holds `attempts`.
    Reused { attempts: u32 },
    /// The namespace was reused but its ledger was unreadable and restarted.
    Recovered,
}

/// Initial state: nothing checked yet.
/// Available actions: `prepare_namespace()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Namespace exists, is empty of probe resources, and has a ledger.
/// Available actions: `provision()`
#[derive(Debug, Clone, Copy)]
pub struct NamespaceReady {
    pub(crate) origin: NamespaceOrigin,
}

/// Secret, image stream, build config, deployment config and service exist.
/// Available actions: `build()`
#[derive(Debug, Clone, Copy)]
pub struct Provisioned {
    pub(crate) origin: NamespaceOrigin,
}

/// The application image was built.
/// Available actions: `create_route()`
#[derive(Debug, Clone)]
pub struct Built {
    pub(crate) origin: NamespaceOrigin,
    pub(crate) build: BuildName,
}

/// The route exposes the service.
/// Available actions: `deploy()`
#[derive(Debug, Clone)]
pub struct Routed {
    pub(crate) origin: NamespaceOrigin,
    pub(crate) build: BuildName,
}

/// The application pod has been scheduled.
/// Available actions: `await_running()`
#[derive(Debug, Clone)]
pub struct Deployed {
    pub(crate) origin: NamespaceOrigin,
    pub(crate) build: BuildName,
    pub(crate) app_pod: PodName,
}

/// The application pod is running.
/// Available actions: `verify()`
#[derive(Debug, Clone)]
pub struct Running {
    pub(crate) origin: NamespaceOrigin,
    pub(crate) app_pod: PodName,
}

/// The application answered with 200.
/// Available actions: `finalize()`
#[derive(Debug, Clone)]
pub struct Verified {
    pub(crate) origin: NamespaceOrigin,
    pub(crate) app_pod: PodName,
    pub(crate) attempts: u32,
}
