// ABOUTME: Per-run settings and wait timings for the probe lifecycle.
// ABOUTME: Built from the validated configuration plus the deploy key contents.

use crate::config::Config;
use crate::types::NamespaceName;
use std::fmt;
use std::time::Duration;

/// Delays and iteration caps of the bounded waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub poll_interval: Duration,
    pub namespace_delete_checks: u32,
    /// Pause after the old namespace disappeared, before recreating it.
    pub namespace_settle: Duration,
    pub create_conflict_retries: u32,
    pub create_conflict_backoff: Duration,
    /// Pause between creating the deploy secret and linking it.
    pub secret_settle: Duration,
    pub build_start_delay: Duration,
    pub build_checks: u32,
    pub app_pod_checks: u32,
    pub running_checks: u32,
    /// Pause for the router to register the new pod.
    pub router_settle: Duration,
    pub verify_attempts: u32,
    pub verify_spacing: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            namespace_delete_checks: 300,
            namespace_settle: Duration::from_secs(5),
            create_conflict_retries: 5,
            create_conflict_backoff: Duration::from_secs(5),
            secret_settle: Duration::from_secs(5),
            build_start_delay: Duration::from_secs(1),
            build_checks: 180,
            app_pod_checks: 40,
            running_checks: 180,
            router_settle: Duration::from_secs(2),
            verify_attempts: 3,
            verify_spacing: Duration::from_secs(3),
        }
    }
}

/// Everything a run needs besides the platform and the probe.
#[derive(Clone)]
pub struct RunSettings {
    pub namespace: NamespaceName,
    /// Hostname the route is bound to and verification requests go to.
    pub app_host: String,
    pub delete_namespace: bool,
    /// Zero disables namespace resets.
    pub max_attempts_between_deletes: u32,
    pub slow_run_threshold: Duration,
    /// SSH private key material for the source secret.
    pub deploy_key: String,
    pub timings: Timings,
}

impl RunSettings {
    pub fn from_config(config: &Config, deploy_key: String) -> Self {
        Self {
            namespace: config.connection.namespace.clone(),
            app_host: config.app_host().to_string(),
            delete_namespace: config.behaviour.delete_ns,
            max_attempts_between_deletes: config.behaviour.max_attempts_between_deletes,
            slow_run_threshold: config.behaviour.slow_run_threshold,
            deploy_key,
            timings: Timings::default(),
        }
    }
}

impl fmt::Debug for RunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSettings")
            .field("namespace", &self.namespace)
            .field("app_host", &self.app_host)
            .field("delete_namespace", &self.delete_namespace)
            .field(
                "max_attempts_between_deletes",
                &self.max_attempts_between_deletes,
            )
            .field("slow_run_threshold", &self.slow_run_threshold)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}
