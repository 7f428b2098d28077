// ABOUTME: Attempt ledger persisted as a ConfigMap inside the probe namespace.
// ABOUTME: Counts cleanup-and-retry cycles between full namespace resets.

use crate::manifest;
use crate::platform::{Platform, PlatformError, ResourceKind};
use crate::types::NamespaceName;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Well-known name of the ledger ConfigMap.
pub const LEDGER_NAME: &str = "health-check-status";

/// Data key holding the counter.
pub const ATTEMPTS_KEY: &str = "attempts";

/// Value a freshly created ledger starts at.
pub const INITIAL_ATTEMPTS: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("attempt ledger health-check-status not found")]
    NotFound,

    #[error("attempt ledger health-check-status is corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Platform(PlatformError),
}

impl From<PlatformError> for LedgerError {
    fn from(err: PlatformError) -> Self {
        if err.is_not_found() {
            LedgerError::NotFound
        } else {
            LedgerError::Platform(err)
        }
    }
}

/// The attempt counter of one namespace.
///
/// There is no locking: a single probe instance per namespace is assumed.
pub struct AttemptLedger<'a, P: ?Sized> {
    platform: &'a P,
    namespace: &'a NamespaceName,
}

impl<'a, P: Platform + ?Sized> AttemptLedger<'a, P> {
    pub fn new(platform: &'a P, namespace: &'a NamespaceName) -> Self {
        Self {
            platform,
            namespace,
        }
    }

    /// Read the current counter.
    pub async fn read(&self) -> Result<u32, LedgerError> {
        let config_map = self
            .platform
            .get_resource(ResourceKind::ConfigMap, self.namespace, LEDGER_NAME)
            .await?;
        parse_attempts(&config_map)
    }

    /// Overwrite the counter.
    pub async fn write(&self, attempts: u32) -> Result<(), LedgerError> {
        let mut data = serde_json::Map::new();
        data.insert(ATTEMPTS_KEY.to_string(), Value::String(attempts.to_string()));
        let patch = json!({ "data": data });
        self.platform
            .patch_resource(ResourceKind::ConfigMap, self.namespace, LEDGER_NAME, &patch)
            .await?;
        Ok(())
    }

    /// Create the ledger object with an initial value.
    pub async fn create(&self, initial: u32) -> Result<(), LedgerError> {
        let mut data = BTreeMap::new();
        data.insert(ATTEMPTS_KEY.to_string(), initial.to_string());
        let config_map = manifest::config_map(LEDGER_NAME, &data);
        self.platform
            .create_resource(self.namespace, &config_map)
            .await?;
        Ok(())
    }

    /// Delete the ledger object. An absent ledger counts as deleted.
    pub async fn delete(&self) -> Result<(), LedgerError> {
        match self
            .platform
            .delete_resource(ResourceKind::ConfigMap, self.namespace, LEDGER_NAME)
            .await
            .map_err(LedgerError::from)
        {
            Ok(()) | Err(LedgerError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Replace a missing or corrupt ledger with a fresh one.
    pub async fn recreate(&self, initial: u32) -> Result<(), LedgerError> {
        self.delete().await?;
        self.create(initial).await
    }
}

/// Extract the counter from a ConfigMap document.
pub fn parse_attempts(config_map: &Value) -> Result<u32, LedgerError> {
    let raw = config_map
        .get("data")
        .and_then(|data| data.get(ATTEMPTS_KEY))
        .ok_or_else(|| LedgerError::Corrupt(format!("missing data.{ATTEMPTS_KEY}")))?;

    match raw {
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| LedgerError::Corrupt(format!("{s:?} is not a counter"))),
        other => Err(LedgerError::Corrupt(format!("{other} is not a string"))),
    }
}
