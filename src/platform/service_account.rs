// ABOUTME: Links and unlinks secrets on a service account.
// ABOUTME: Read-modify-replace of the account's `secrets` list.

use super::error::PlatformError;
use super::kind::ResourceKind;
use super::traits::Platform;
use crate::types::NamespaceName;
use serde_json::{Value, json};

fn secrets_mut<'a>(account: &'a mut Value, path: &str) -> Result<&'a mut Vec<Value>, PlatformError> {
    let object = account.as_object_mut().ok_or_else(|| PlatformError::Decode {
        path: path.to_string(),
        message: "service account is not an object".to_string(),
    })?;
    let secrets = object
        .entry("secrets")
        .or_insert_with(|| Value::Array(Vec::new()));
    if secrets.is_null() {
        *secrets = Value::Array(Vec::new());
    }
    secrets.as_array_mut().ok_or_else(|| PlatformError::Decode {
        path: path.to_string(),
        message: "service account secrets is not a list".to_string(),
    })
}

fn has_name(entry: &Value, name: &str) -> bool {
    entry.get("name").and_then(Value::as_str) == Some(name)
}

/// Add `secret` to the secrets of `service_account`. Linking twice is a no-op.
pub async fn link_secret<P: Platform + ?Sized>(
    platform: &P,
    namespace: &NamespaceName,
    service_account: &str,
    secret: &str,
) -> Result<(), PlatformError> {
    let kind = ResourceKind::ServiceAccount;
    let path = kind.item_path(namespace, service_account);
    let mut account = platform
        .get_resource(kind, namespace, service_account)
        .await?;

    let secrets = secrets_mut(&mut account, &path)?;
    if secrets.iter().any(|entry| has_name(entry, secret)) {
        return Ok(());
    }
    secrets.push(json!({"name": secret}));

    platform
        .replace_resource(kind, namespace, service_account, &account)
        .await
}

/// Remove every reference to `secret` from `service_account`.
pub async fn unlink_secret<P: Platform + ?Sized>(
    platform: &P,
    namespace: &NamespaceName,
    service_account: &str,
    secret: &str,
) -> Result<(), PlatformError> {
    let kind = ResourceKind::ServiceAccount;
    let path = kind.item_path(namespace, service_account);
    let mut account = platform
        .get_resource(kind, namespace, service_account)
        .await?;

    let secrets = secrets_mut(&mut account, &path)?;
    let before = secrets.len();
    secrets.retain(|entry| !has_name(entry, secret));
    if secrets.len() == before {
        return Ok(());
    }

    platform
        .replace_resource(kind, namespace, service_account, &account)
        .await
}
