// ABOUTME: Namespace preparation: ledger bookkeeping, reset, creation and cleanup.
// ABOUTME: Moves a run from Initialized to NamespaceReady.

use snafu::ResultExt;
use tokio::time::sleep;

use crate::diagnostics::Warning;
use crate::ledger::{AttemptLedger, INITIAL_ATTEMPTS};
use crate::manifest;
use crate::output::Output;
use crate::platform::{Platform, PlatformError, ResourceKind, unlink_secret};
use crate::poll::{PollError, PollStatus, Poller};
use crate::types::NamespaceName;

use super::error::{
    CleanupSnafu, LedgerSnafu, LifecycleError, NamespaceCreateConflictSnafu,
    NamespaceDeleteTimeoutSnafu,
};
use super::run::Run;
use super::settings::Timings;
use super::state::{Initialized, NamespaceOrigin, NamespaceReady};
use super::topology;

/// Attempt count assumed when the ledger cannot be read. Always reaches
/// a non-zero reset threshold.
pub const UNREADABLE_ATTEMPTS: u32 = u32::MAX;

/// Leftovers removed before reuse, in dependency order. The deploy secret is
/// handled separately because it has to be unlinked first.
const CLEANUP_ORDER: [(ResourceKind, &str); 5] = [
    (ResourceKind::Route, topology::ROUTE),
    (ResourceKind::Service, topology::SERVICE),
    (ResourceKind::DeploymentConfig, topology::DEPLOYMENT_CONFIG),
    (ResourceKind::BuildConfig, topology::BUILD_CONFIG),
    (ResourceKind::ImageStream, topology::IMAGE_STREAM),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    /// Delete the namespace and start over.
    Reset,
    /// Keep the namespace and clean it.
    Reuse,
}

/// Whether a namespace with `attempts` recorded runs has to be recreated.
/// A threshold of zero disables resets.
pub fn reset_decision(attempts: u32, max_attempts_between_deletes: u32) -> ResetDecision {
    if max_attempts_between_deletes > 0 && attempts >= max_attempts_between_deletes {
        ResetDecision::Reset
    } else {
        ResetDecision::Reuse
    }
}

/// What the ledger held when it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedgerReading {
    Count(u32),
    /// The ledger was missing or corrupt and has been recreated.
    Unreadable,
}

impl LedgerReading {
    fn attempts(self) -> u32 {
        match self {
            LedgerReading::Count(n) => n,
            LedgerReading::Unreadable => UNREADABLE_ATTEMPTS,
        }
    }
}

/// Result of a single project request.
enum CreateOutcome {
    Created,
    /// A namespace with that name is still terminating.
    Conflict,
    Fatal(PlatformError),
}

impl Run<Initialized> {
    /// Make sure the namespace exists, carries a ledger and holds no
    /// leftovers from earlier runs. Deletes and recreates it when the
    /// attempt threshold has been reached.
    pub async fn prepare_namespace<P: Platform + ?Sized>(
        mut self,
        platform: &P,
        out: &Output,
    ) -> Result<Run<NamespaceReady>, LifecycleError> {
        let namespace = self.settings.namespace.clone();
        let ledger = AttemptLedger::new(platform, &namespace);
        let max = self.settings.max_attempts_between_deletes;

        let mut reading = None;
        let mut reset_from = None;

        if check_exists(platform, &namespace).await? {
            let current = self.read_ledger(&ledger, out).await?;
            match current {
                LedgerReading::Count(n) => out.info(&format!("Attempts count: {n}")),
                LedgerReading::Unreadable => out.info("Attempts count: unknown"),
            }
            if reset_decision(current.attempts(), max) == ResetDecision::Reset {
                out.info("Removing namespace and waiting for it to be removed.");
                remove_namespace(platform, &namespace, &self.settings.timings).await?;
                reset_from = Some(current.attempts());
            } else {
                reading = Some(current);
            }
        }

        out.info("Checking if namespace exists");
        let origin = if !check_exists(platform, &namespace).await? {
            out.info("Creating namespace...");
            create_namespace(platform, &namespace, &self.settings.timings, out).await?;
            ledger.create(INITIAL_ATTEMPTS).await.context(LedgerSnafu)?;
            match reset_from {
                Some(previous_attempts) => NamespaceOrigin::Recreated { previous_attempts },
                None => NamespaceOrigin::Created,
            }
        } else {
            out.info("Namespace already exists");
            out.info("Cleaning up!");
            self.cleanup(platform, &namespace, out).await?;

            let reading = match reading {
                Some(reading) => reading,
                None => self.read_ledger(&ledger, out).await?,
            };
            match reading {
                LedgerReading::Count(n) => {
                    let attempts = n.saturating_add(1);
                    ledger.write(attempts).await.context(LedgerSnafu)?;
                    NamespaceOrigin::Reused { attempts }
                }
                LedgerReading::Unreadable => {
                    ledger.write(INITIAL_ATTEMPTS).await.context(LedgerSnafu)?;
                    NamespaceOrigin::Recovered
                }
            }
        };

        tracing::info!(namespace = %namespace, ?origin, "namespace ready");
        Ok(self.transition(NamespaceReady { origin }))
    }

    /// Read the attempt count. A missing or corrupt ledger is replaced with
    /// a fresh one and reported as unreadable.
    async fn read_ledger<P: Platform + ?Sized>(
        &mut self,
        ledger: &AttemptLedger<'_, P>,
        out: &Output,
    ) -> Result<LedgerReading, LifecycleError> {
        match ledger.read().await {
            Ok(attempts) => Ok(LedgerReading::Count(attempts)),
            Err(err) => {
                self.warn(
                    out,
                    Warning::ledger_recovered(format!(
                        "Getting attempts failed ({err})! Assuming a very high attempt count and recreating the ledger."
                    )),
                );
                ledger.recreate(INITIAL_ATTEMPTS).await.context(LedgerSnafu)?;
                Ok(LedgerReading::Unreadable)
            }
        }
    }

    /// Remove the probe's resources from a reused namespace. Missing
    /// resources are expected; other delete failures become warnings.
    async fn cleanup<P: Platform + ?Sized>(
        &mut self,
        platform: &P,
        namespace: &NamespaceName,
        out: &Output,
    ) -> Result<(), LifecycleError> {
        for (kind, name) in CLEANUP_ORDER {
            self.delete_leftover(platform, namespace, kind, name, out)
                .await;
        }

        match unlink_secret(
            platform,
            namespace,
            topology::BUILDER_SERVICE_ACCOUNT,
            topology::DEPLOY_SECRET,
        )
        .await
        {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(source) => {
                return Err(source).context(CleanupSnafu {
                    step: "unlink deploy secret",
                });
            }
        }

        self.delete_leftover(
            platform,
            namespace,
            ResourceKind::Secret,
            topology::DEPLOY_SECRET,
            out,
        )
        .await;
        Ok(())
    }

    async fn delete_leftover<P: Platform + ?Sized>(
        &mut self,
        platform: &P,
        namespace: &NamespaceName,
        kind: ResourceKind,
        name: &str,
        out: &Output,
    ) {
        match platform.delete_resource(kind, namespace, name).await {
            Ok(()) => tracing::debug!(%kind, name, "removed leftover"),
            Err(err) if err.is_not_found() => tracing::debug!(%kind, name, "nothing to remove"),
            Err(err) => self.warn(
                out,
                Warning::cleanup(format!("Could not delete {kind} {name}: {err}")),
            ),
        }
    }
}

async fn check_exists<P: Platform + ?Sized>(
    platform: &P,
    namespace: &NamespaceName,
) -> Result<bool, LifecycleError> {
    platform
        .namespace_exists(namespace)
        .await
        .map_err(|source| LifecycleError::NamespaceCheck {
            namespace: namespace.to_string(),
            source,
        })
}

/// Delete the namespace and wait until it is gone.
async fn remove_namespace<P: Platform + ?Sized>(
    platform: &P,
    namespace: &NamespaceName,
    timings: &Timings,
) -> Result<(), LifecycleError> {
    match platform
        .delete_resource(ResourceKind::Project, namespace, namespace.as_str())
        .await
    {
        Ok(()) => {}
        Err(err) if err.is_not_found() => {}
        Err(source) => {
            return Err(LifecycleError::NamespaceDelete {
                namespace: namespace.to_string(),
                source,
            });
        }
    }

    let poller = Poller::new(timings.poll_interval, timings.namespace_delete_checks);
    poller
        .wait_until(move |_| async move {
            match platform.namespace_exists(namespace).await {
                Ok(false) => PollStatus::Ready(()),
                Ok(true) => PollStatus::Pending,
                Err(err) => PollStatus::Failed(err),
            }
        })
        .await
        .map_err(|err| match err {
            PollError::Timeout { iterations } => NamespaceDeleteTimeoutSnafu {
                namespace: namespace.as_str(),
                iterations,
            }
            .build(),
            PollError::Failed(source) => LifecycleError::NamespaceCheck {
                namespace: namespace.to_string(),
                source,
            },
        })?;

    // Project requests for a just-deleted name still conflict for a while.
    sleep(timings.namespace_settle).await;
    Ok(())
}

async fn request_project<P: Platform + ?Sized>(
    platform: &P,
    namespace: &NamespaceName,
) -> CreateOutcome {
    match platform
        .create_resource(namespace, &manifest::project_request(namespace))
        .await
    {
        Ok(()) => CreateOutcome::Created,
        Err(err) if err.is_conflict() => CreateOutcome::Conflict,
        Err(err) => CreateOutcome::Fatal(err),
    }
}

/// Request the project, retrying while the old namespace is terminating.
async fn create_namespace<P: Platform + ?Sized>(
    platform: &P,
    namespace: &NamespaceName,
    timings: &Timings,
    out: &Output,
) -> Result<(), LifecycleError> {
    let retries = timings.create_conflict_retries;
    for attempt in 1..=retries {
        match request_project(platform, namespace).await {
            CreateOutcome::Created => return Ok(()),
            CreateOutcome::Fatal(source) => {
                return Err(LifecycleError::NamespaceCreate {
                    namespace: namespace.to_string(),
                    source,
                });
            }
            CreateOutcome::Conflict => {
                out.info(&format!(
                    "Namespace {namespace} still exists, retrying creation ({attempt}/{retries})"
                ));
                if attempt < retries {
                    sleep(timings.create_conflict_backoff).await;
                }
            }
        }
    }

    NamespaceCreateConflictSnafu {
        namespace: namespace.as_str(),
        attempts: retries,
    }
    .fail()
}
