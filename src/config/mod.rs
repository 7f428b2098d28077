// ABOUTME: Configuration types and parsing for deployprobe.yml.
// ABOUTME: Handles YAML parsing, discovery, and validation before any API call.

mod auth;
mod env_value;

pub use auth::{AuthenticationConfig, Credentials};
pub use env_value::EnvValue;

use crate::error::{Error, Result};
use crate::types::NamespaceName;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "deployprobe.yml";
pub const CONFIG_FILENAME_ALT: &str = "deployprobe.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deployprobe/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,

    pub authentication: AuthenticationConfig,

    pub behaviour: BehaviourConfig,

    /// SSH private key the build uses to check out the application source.
    #[serde(default = "default_deploy_key")]
    pub deploy_key: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub api_url: String,

    /// Hostname the application route is exposed on.
    pub app_url: String,

    pub namespace: NamespaceName,

    #[serde(default)]
    pub tls_verify: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviourConfig {
    /// Delete the namespace after a successful verification.
    pub delete_ns: bool,

    /// Reset the namespace once this many cleanup cycles were recorded.
    /// Zero disables resets.
    pub max_attempts_between_deletes: u32,

    /// Runs slower than this fail even when the application is healthy.
    #[serde(default = "default_slow_run_threshold", with = "humantime_serde")]
    pub slow_run_threshold: Duration,
}

fn default_deploy_key() -> PathBuf {
    PathBuf::from("health-check-deploy")
}

fn default_slow_run_threshold() -> Duration {
    Duration::from_secs(300)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.connection.api_url.trim().is_empty() {
            return Err(Error::InvalidConfig("No API URL given.".to_string()));
        }
        if self.connection.app_url.trim().is_empty() {
            return Err(Error::InvalidConfig("No app URL given.".to_string()));
        }
        if route_host(&self.connection.app_url).is_none() {
            return Err(Error::InvalidConfig(format!(
                "App URL {:?} is not a hostname.",
                self.connection.app_url
            )));
        }
        let auth = &self.authentication;
        if auth.token.is_none() && (auth.username.is_none() || auth.password.is_none()) {
            return Err(Error::NoAuthentication);
        }
        Ok(())
    }

    /// API base URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.connection.api_url.trim().trim_end_matches('/')
    }

    /// Bare hostname for the route, with any `http(s)://` scheme and
    /// trailing slash removed.
    pub fn app_host(&self) -> &str {
        let raw = &self.connection.app_url;
        route_host(raw).unwrap_or_else(|| raw.trim())
    }
}

fn route_host(raw: &str) -> Option<&str> {
    let host = raw.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host)
        .trim_end_matches('/');
    let valid = !host.is_empty()
        && host.len() <= 253
        && host
            .split('.')
            .all(|label| {
                !label.is_empty()
                    && label.len() <= 63
                    && !label.starts_with('-')
                    && !label.ends_with('-')
                    && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            });
    valid.then_some(host)
}
