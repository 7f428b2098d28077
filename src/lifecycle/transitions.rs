// ABOUTME: State transitions from a ready namespace to a verified application.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::sync::atomic::{AtomicBool, Ordering};

use snafu::ResultExt;
use tokio::time::sleep;

use crate::diagnostics::Warning;
use crate::manifest::{self, Manifest};
use crate::output::Output;
use crate::platform::{Platform, PodPhase, ResourceKind, link_secret};
use crate::poll::{PollError, PollStatus, Poller};
use crate::probe::AppProbe;
use crate::types::NamespaceName;

use super::error::{
    AppPodNotFoundSnafu, BuildFailedSnafu, BuildTimeoutSnafu, BuildTriggerSnafu,
    DeployTriggerSnafu, LifecycleError, PodFailedSnafu, PodStartTimeoutSnafu, ProvisionSnafu,
    RouteSnafu, SlowRunSnafu, VerificationFailedSnafu,
};
use super::run::{Run, RunReport};
use super::state::{Built, Deployed, NamespaceReady, Provisioned, Routed, Running, Verified};
use super::topology;

async fn create<P: Platform + ?Sized>(
    platform: &P,
    namespace: &NamespaceName,
    manifest: &Manifest,
) -> Result<(), LifecycleError> {
    platform
        .create_resource(namespace, manifest)
        .await
        .context(ProvisionSnafu {
            step: manifest.kind().kind_name(),
        })
}

/// Text recorded as the build trigger message.
fn trigger_message() -> String {
    let host = gethostname::gethostname();
    format!("deployprobe on {}", host.to_string_lossy())
}

fn list_failed<T>(source: crate::platform::PlatformError) -> PollStatus<T, LifecycleError> {
    PollStatus::Failed(LifecycleError::Platform { source })
}

impl Run<NamespaceReady> {
    /// Create the deploy secret, link it for builds, and create the image
    /// stream, build config, deployment config and service.
    pub async fn provision<P: Platform + ?Sized>(
        self,
        platform: &P,
        out: &Output,
    ) -> Result<Run<Provisioned>, LifecycleError> {
        let namespace = &self.settings.namespace;

        out.info("Creating secret...");
        let secret = manifest::ssh_key_secret(topology::DEPLOY_SECRET, &self.settings.deploy_key);
        create(platform, namespace, &secret).await?;
        // The builder service account cannot see the secret right away.
        sleep(self.settings.timings.secret_settle).await;

        out.info("Linking secret to builder service account...");
        link_secret(
            platform,
            namespace,
            topology::BUILDER_SERVICE_ACCOUNT,
            topology::DEPLOY_SECRET,
        )
        .await
        .context(ProvisionSnafu {
            step: "secret link",
        })?;

        out.info("Creating ImageStream...");
        create(platform, namespace, &topology::image_stream()).await?;

        out.info("Creating BuildConfig...");
        create(platform, namespace, &topology::build_config()).await?;

        out.info("Creating DeploymentConfig...");
        create(platform, namespace, &topology::deployment_config(namespace)).await?;

        out.info("Creating Service...");
        create(platform, namespace, &topology::service()).await?;

        let origin = self.state.origin;
        Ok(self.transition(Provisioned { origin }))
    }
}

impl Run<Provisioned> {
    /// Trigger the first build and wait for its pod to succeed.
    pub async fn build<P: Platform + ?Sized>(
        mut self,
        platform: &P,
        out: &Output,
    ) -> Result<Run<Built>, LifecycleError> {
        let namespace = self.settings.namespace.clone();
        let timings = self.settings.timings.clone();

        out.info("Starting build...");
        platform
            .instantiate(
                &namespace,
                &manifest::build_request(topology::BUILD_CONFIG, &trigger_message()),
            )
            .await
            .context(BuildTriggerSnafu {
                build_config: topology::BUILD_CONFIG,
            })?;
        sleep(timings.build_start_delay).await;

        let build = topology::first_build();
        let build_pod = build.pod_name();
        let announced = AtomicBool::new(false);
        let (namespace_ref, build_pod_ref, announced_ref) = (&namespace, &build_pod, &announced);

        let node = Poller::new(timings.poll_interval, timings.build_checks)
            .wait_until(move |_| async move {
                let pods = match platform.list_pods(namespace_ref).await {
                    Ok(pods) => pods,
                    Err(source) => return list_failed(source),
                };
                let Some(pod) = pods.get(build_pod_ref) else {
                    return PollStatus::Pending;
                };
                if !announced_ref.swap(true, Ordering::Relaxed) {
                    out.info(&format!("Build running on node {}", pod.node));
                }
                if pod.phase == PodPhase::Succeeded {
                    PollStatus::Ready(pod.node.clone())
                } else if pod.phase.is_errored() {
                    PollStatus::Failed(
                        BuildFailedSnafu {
                            pod: build_pod_ref.as_str(),
                            phase: pod.phase.as_str(),
                        }
                        .build(),
                    )
                } else {
                    PollStatus::Pending
                }
            })
            .await
            .map_err(|err| match err {
                PollError::Timeout { iterations } => BuildTimeoutSnafu { iterations }.build(),
                PollError::Failed(err) => err,
            })?;

        self.nodes.build = Some(node);
        let origin = self.state.origin;
        Ok(self.transition(Built { origin, build }))
    }
}

impl Run<Built> {
    /// Expose the service under the configured application host.
    pub async fn create_route<P: Platform + ?Sized>(
        self,
        platform: &P,
        out: &Output,
    ) -> Result<Run<Routed>, LifecycleError> {
        out.info("Creating Route...");
        let host = &self.settings.app_host;
        platform
            .create_resource(&self.settings.namespace, &topology::route(host))
            .await
            .context(RouteSnafu { host: host.as_str() })?;

        let state = Routed {
            origin: self.state.origin,
            build: self.state.build.clone(),
        };
        Ok(self.transition(state))
    }
}

impl Run<Routed> {
    /// Roll out the deployment config and wait for its application pod to
    /// be scheduled.
    pub async fn deploy<P: Platform + ?Sized>(
        mut self,
        platform: &P,
        out: &Output,
    ) -> Result<Run<Deployed>, LifecycleError> {
        let namespace = &self.settings.namespace;
        let timings = &self.settings.timings;

        out.info("Starting deployment...");
        platform
            .instantiate(
                namespace,
                &manifest::deployment_request(topology::DEPLOYMENT_CONFIG),
            )
            .await
            .context(DeployTriggerSnafu {
                deployment_config: topology::DEPLOYMENT_CONFIG,
            })?;

        let app = Poller::new(timings.poll_interval, timings.app_pod_checks)
            .wait_until(move |_| async move {
                match platform.list_pods(namespace).await {
                    Ok(pods) => match pods.iter().find(|pod| topology::is_app_pod(&pod.name)) {
                        Some(pod) => PollStatus::Ready(pod.clone()),
                        None => PollStatus::Pending,
                    },
                    Err(source) => list_failed(source),
                }
            })
            .await
            .map_err(|err| match err {
                PollError::Timeout { iterations } => AppPodNotFoundSnafu { iterations }.build(),
                PollError::Failed(err) => err,
            })?;

        out.info(&format!(
            "Application pod found with name: {}, running on node {}",
            app.name, app.node
        ));
        self.nodes.app = Some(app.node);

        let state = Deployed {
            origin: self.state.origin,
            build: self.state.build.clone(),
            app_pod: app.name,
        };
        Ok(self.transition(state))
    }
}

impl Run<Deployed> {
    /// Wait for the application pod to run. A build pod that turned to an
    /// error phase in the meantime fails the run too.
    pub async fn await_running<P: Platform + ?Sized>(
        self,
        platform: &P,
        out: &Output,
    ) -> Result<Run<Running>, LifecycleError> {
        let namespace = &self.settings.namespace;
        let timings = &self.settings.timings;
        let build_pod = self.state.build.pod_name();
        let app_pod = &self.state.app_pod;
        let build_pod_ref = &build_pod;

        out.info("Waiting for deployment to complete.");
        Poller::new(timings.poll_interval, timings.running_checks)
            .wait_until(move |_| async move {
                let pods = match platform.list_pods(namespace).await {
                    Ok(pods) => pods,
                    Err(source) => return list_failed(source),
                };
                if let Some(build) = pods.get(build_pod_ref)
                    && build.phase.is_errored()
                {
                    return PollStatus::Failed(
                        BuildFailedSnafu {
                            pod: build_pod_ref.as_str(),
                            phase: build.phase.as_str(),
                        }
                        .build(),
                    );
                }
                match pods.get(app_pod) {
                    Some(pod) if pod.phase == PodPhase::Running => PollStatus::Ready(()),
                    Some(pod) if pod.phase.is_errored() => PollStatus::Failed(
                        PodFailedSnafu {
                            pod: app_pod.as_str(),
                            phase: pod.phase.as_str(),
                        }
                        .build(),
                    ),
                    _ => PollStatus::Pending,
                }
            })
            .await
            .map_err(|err| match err {
                PollError::Timeout { iterations } => PodStartTimeoutSnafu {
                    pod: app_pod.as_str(),
                    iterations,
                }
                .build(),
                PollError::Failed(err) => err,
            })?;

        let state = Running {
            origin: self.state.origin,
            app_pod: self.state.app_pod.clone(),
        };
        Ok(self.transition(state))
    }
}

impl Run<Running> {
    /// Request the application through the route until it answers 200.
    pub async fn verify<A: AppProbe + ?Sized>(
        mut self,
        probe: &A,
        out: &Output,
    ) -> Result<Run<Verified>, LifecycleError> {
        let host = self.settings.app_host.clone();
        let timings = self.settings.timings.clone();

        // The router needs a moment to pick up the new endpoint.
        sleep(timings.router_settle).await;

        let attempts = timings.verify_attempts;
        for attempt in 1..=attempts {
            match probe.get(&host).await {
                Ok(200) => {
                    out.info("Status code 200 received. Everything is working correctly!");
                    let state = Verified {
                        origin: self.state.origin,
                        app_pod: self.state.app_pod.clone(),
                        attempts: attempt,
                    };
                    return Ok(self.transition(state));
                }
                Ok(status) => self.warn(
                    out,
                    Warning::verification_attempt(format!(
                        "Wrong status code received: {status}, attempts: {attempt}"
                    )),
                ),
                Err(err) => self.warn(
                    out,
                    Warning::verification_attempt(format!(
                        "Request failed: {err}, attempts: {attempt}"
                    )),
                ),
            }
            if attempt < attempts {
                sleep(timings.verify_spacing).await;
            }
        }

        VerificationFailedSnafu { host, attempts }.fail()
    }
}

impl Run<Verified> {
    /// Optionally delete the namespace, then check the run against the
    /// duration budget.
    pub async fn finalize<P: Platform + ?Sized>(
        mut self,
        platform: &P,
        out: &Output,
    ) -> Result<RunReport, LifecycleError> {
        let namespace = self.settings.namespace.clone();

        let mut namespace_deleted = false;
        if self.settings.delete_namespace {
            out.info("Delete own project.");
            match platform
                .delete_resource(ResourceKind::Project, &namespace, namespace.as_str())
                .await
            {
                Ok(()) => namespace_deleted = true,
                Err(err) => self.warn(
                    out,
                    Warning::namespace_delete(format!(
                        "Deleting namespace {namespace} failed: {err}"
                    )),
                ),
            }
        }

        let elapsed = out.elapsed();
        let threshold = self.settings.slow_run_threshold;
        // Compared in whole seconds.
        if elapsed.as_secs() > threshold.as_secs() {
            return SlowRunSnafu {
                elapsed_secs: elapsed.as_secs(),
                threshold_secs: threshold.as_secs(),
            }
            .fail();
        }

        Ok(RunReport {
            namespace,
            origin: self.state.origin,
            app_pod: self.state.app_pod,
            app_node: self.nodes.app,
            build_node: self.nodes.build,
            verification_attempts: self.state.attempts,
            namespace_deleted,
            elapsed,
            warnings: self.diagnostics.into_warnings(),
        })
    }
}
