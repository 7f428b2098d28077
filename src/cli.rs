// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: A single probe run per invocation, no subcommands.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deployprobe")]
#[command(about = "Deploy a sample application to OpenShift and verify it end to end")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (default: discover in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show debug logs from the probe internals
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print progress as JSON lines
    #[arg(long)]
    pub json: bool,
}
