// ABOUTME: Application-wide error types for deployprobe.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::lifecycle::LifecycleError;
use crate::platform::PlatformError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No authentication specified in config: set a token or a username and password.")]
    NoAuthentication,

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("failed to read deploy key {path}: {source}")]
    DeployKey {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("platform connection failed: {0}")]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
