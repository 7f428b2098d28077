// ABOUTME: Authentication section of the probe configuration.
// ABOUTME: Resolves a bearer token or a username/password pair.

use super::EnvValue;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthenticationConfig {
    #[serde(default)]
    pub token: Option<EnvValue>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<EnvValue>,
}

/// Resolved credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Password { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(..)"),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

impl AuthenticationConfig {
    /// A token wins over username/password when both are configured.
    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(token) = &self.token {
            return Ok(Credentials::Token(token.resolve()?));
        }

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(Credentials::Password {
                username: username.clone(),
                password: password.resolve()?,
            }),
            _ => Err(Error::NoAuthentication),
        }
    }
}
