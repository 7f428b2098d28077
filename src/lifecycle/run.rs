// ABOUTME: Generic probe run struct parameterized by state marker.
// ABOUTME: Holds settings and collected warnings across transitions.

use std::time::Duration;

use crate::diagnostics::{Diagnostics, Warning};
use crate::output::Output;
use crate::types::{NamespaceName, PodName};

use super::settings::RunSettings;
use super::state::{Initialized, NamespaceOrigin};

/// A probe run in progress, parameterized by its current state.
///
/// The state type parameter `S` carries the names produced by earlier
/// transitions, so the build pod or app pod can only be looked up once
/// a transition has actually produced it.
#[derive(Debug)]
pub struct Run<S> {
    pub(crate) settings: RunSettings,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) nodes: Nodes,
    pub(crate) state: S,
}

/// Nodes the build and application pods were scheduled on, for the report.
#[derive(Debug, Default, Clone)]
pub(crate) struct Nodes {
    pub(crate) build: Option<String>,
    pub(crate) app: Option<String>,
}

impl Run<Initialized> {
    pub fn new(settings: RunSettings) -> Self {
        Run {
            settings,
            diagnostics: Diagnostics::default(),
            nodes: Nodes::default(),
            state: Initialized,
        }
    }
}

impl<S> Run<S> {
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn transition<T>(self, state: T) -> Run<T> {
        Run {
            settings: self.settings,
            diagnostics: self.diagnostics,
            nodes: self.nodes,
            state,
        }
    }

    /// Record a non-fatal warning and show it to the operator.
    pub(crate) fn warn(&mut self, out: &Output, warning: Warning) {
        out.warning(&warning.message);
        self.diagnostics.warn(warning);
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub namespace: NamespaceName,
    pub origin: NamespaceOrigin,
    pub app_pod: PodName,
    pub app_node: Option<String>,
    pub build_node: Option<String>,
    /// Verification attempt that received 200 (1-based).
    pub verification_attempts: u32,
    pub namespace_deleted: bool,
    pub elapsed: Duration,
    pub warnings: Vec<Warning>,
}
