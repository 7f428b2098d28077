// ABOUTME: Capability trait for the container platform API.
// ABOUTME: The lifecycle only talks to the platform through this seam.

use super::error::PlatformError;
use super::kind::ResourceKind;
use super::pods::PodList;
use crate::manifest::Manifest;
use crate::types::NamespaceName;
use async_trait::async_trait;
use serde_json::Value;

/// Authenticated operations against the platform's REST API.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Whether the namespace exists. 403 and 404 both count as absent.
    async fn namespace_exists(&self, namespace: &NamespaceName) -> Result<bool, PlatformError>;

    /// Create the object described by `manifest` in `namespace`.
    async fn create_resource(
        &self,
        namespace: &NamespaceName,
        manifest: &Manifest,
    ) -> Result<(), PlatformError>;

    /// Fetch a single object.
    async fn get_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
    ) -> Result<Value, PlatformError>;

    /// Replace a whole object.
    async fn replace_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
        body: &Value,
    ) -> Result<(), PlatformError>;

    /// Apply a strategic merge patch.
    async fn patch_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
        patch: &Value,
    ) -> Result<(), PlatformError>;

    /// Delete an object with background propagation.
    async fn delete_resource(
        &self,
        kind: ResourceKind,
        namespace: &NamespaceName,
        name: &str,
    ) -> Result<(), PlatformError>;

    /// Post an instantiate request (build or deployment trigger).
    async fn instantiate(
        &self,
        namespace: &NamespaceName,
        request: &Manifest,
    ) -> Result<(), PlatformError>;

    /// Scheduled pods of the namespace.
    async fn list_pods(&self, namespace: &NamespaceName) -> Result<PodList, PlatformError>;
}
