// ABOUTME: Drives one probe run through every lifecycle state.
// ABOUTME: The first fatal error aborts the run; warnings end up in the report.

use crate::output::Output;
use crate::platform::Platform;
use crate::probe::AppProbe;

use super::error::LifecycleError;
use super::run::{Run, RunReport};
use super::settings::RunSettings;

/// Run the full probe: prepare the namespace, build and deploy the sample
/// application, verify it answers, and tidy up.
pub async fn run<P, A>(
    settings: RunSettings,
    platform: &P,
    probe: &A,
    out: &Output,
) -> Result<RunReport, LifecycleError>
where
    P: Platform + ?Sized,
    A: AppProbe + ?Sized,
{
    let namespace = settings.namespace.clone();
    tracing::info!(namespace = %namespace, "starting probe run");

    let run = Run::new(settings)
        .prepare_namespace(platform, out)
        .await?
        .provision(platform, out)
        .await?
        .build(platform, out)
        .await?
        .create_route(platform, out)
        .await?
        .deploy(platform, out)
        .await?
        .await_running(platform, out)
        .await?
        .verify(probe, out)
        .await?;

    let report = run.finalize(platform, out).await?;
    tracing::info!(
        namespace = %namespace,
        elapsed = ?report.elapsed,
        warnings = report.warnings.len(),
        "probe run finished"
    );
    Ok(report)
}
