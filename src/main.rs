// ABOUTME: Entry point for the deployprobe CLI application.
// ABOUTME: Loads configuration, authenticates, and drives one probe run.

mod cli;

use clap::Parser;
use cli::Cli;
use deployprobe::config::{Config, Credentials};
use deployprobe::error::{Error, Result};
use deployprobe::lifecycle::{self, RunReport, RunSettings};
use deployprobe::output::{Output, OutputMode};
use deployprobe::platform::ApiClient;
use deployprobe::probe::HttpProbe;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    match run(&cli, &output).await {
        Ok(report) => {
            output.success(&format!(
                "Probe run finished in {}s with {} warning(s)",
                report.elapsed.as_secs(),
                report.warnings.len()
            ));
        }
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli, output: &Output) -> Result<RunReport> {
    let config = match &cli.config {
        Some(path) if !path.exists() => return Err(Error::ConfigNotFound(path.clone())),
        Some(path) => Config::load(path)?,
        None => Config::discover(&env::current_dir()?)?,
    };

    // Everything that can fail locally fails before the first API call.
    let credentials = config.authentication.credentials()?;
    let deploy_key =
        std::fs::read_to_string(&config.deploy_key).map_err(|source| Error::DeployKey {
            path: config.deploy_key.clone(),
            source,
        })?;

    let tls_verify = config.connection.tls_verify;
    let client = match credentials {
        Credentials::Token(token) => {
            output.info("Using token for authentication.");
            ApiClient::with_token(config.api_url(), &token, tls_verify)?
        }
        Credentials::Password { username, password } => {
            output.info("Using username and password for authentication.");
            ApiClient::login(config.api_url(), &username, &password, tls_verify).await?
        }
    };

    let settings = RunSettings::from_config(&config, deploy_key);
    let probe = HttpProbe::default();
    let report = lifecycle::run(settings, &client, &probe, output).await?;
    Ok(report)
}
