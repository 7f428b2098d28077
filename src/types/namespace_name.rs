// ABOUTME: Name of the namespace the probe creates, resets and deletes.
// ABOUTME: RFC 1123 label rules plus a guard against platform-owned namespaces.

use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;

/// Longest name the API accepts for a namespace.
const MAX_LEN: usize = 63;

/// Namespaces the platform itself owns. The probe deletes its namespace on
/// reset, so these are never valid targets.
const RESERVED: &[&str] = &["default", "openshift", "kube-system", "kube-public"];
const RESERVED_PREFIXES: &[&str] = &["openshift-", "kube-"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamespaceNameError {
    #[error("namespace cannot be empty")]
    Empty,

    #[error("namespace exceeds maximum length of 63 characters")]
    TooLong,

    #[error("namespace cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("namespace cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("namespace must be lowercase")]
    NotLowercase,

    #[error("invalid character in namespace: '{0}'")]
    InvalidChar(char),

    #[error("namespace '{0}' belongs to the platform")]
    Reserved(String),
}

/// Name of the disposable namespace (OpenShift project) the probe owns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(String);

impl NamespaceName {
    pub fn new(value: &str) -> Result<Self, NamespaceNameError> {
        match (value.chars().next(), value.chars().last()) {
            (None, _) => return Err(NamespaceNameError::Empty),
            (Some('-'), _) => return Err(NamespaceNameError::StartsWithHyphen),
            (_, Some('-')) => return Err(NamespaceNameError::EndsWithHyphen),
            _ => {}
        }
        if value.len() > MAX_LEN {
            return Err(NamespaceNameError::TooLong);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '-'))
        {
            return Err(if c.is_ascii_uppercase() {
                NamespaceNameError::NotLowercase
            } else {
                NamespaceNameError::InvalidChar(c)
            });
        }

        if RESERVED.contains(&value) || RESERVED_PREFIXES.iter().any(|p| value.starts_with(p)) {
            return Err(NamespaceNameError::Reserved(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NamespaceName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        NamespaceName::new(&s).map_err(serde::de::Error::custom)
    }
}
