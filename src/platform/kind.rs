// ABOUTME: Enumerates the platform resource kinds the probe touches.
// ABOUTME: Maps each kind to its API group, version and REST endpoint paths.

use crate::types::NamespaceName;
use std::fmt;

/// Resource kinds addressed through the platform REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Core namespace, used for existence checks only.
    Namespace,
    /// Self-service project creation request.
    ProjectRequest,
    /// Project, used for deletion of the whole namespace.
    Project,
    ConfigMap,
    Secret,
    ServiceAccount,
    Service,
    Pod,
    ImageStream,
    BuildConfig,
    DeploymentConfig,
    Route,
}

impl ResourceKind {
    /// The `kind` field of manifests of this type.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::ProjectRequest => "ProjectRequest",
            ResourceKind::Project => "Project",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::Service => "Service",
            ResourceKind::Pod => "Pod",
            ResourceKind::ImageStream => "ImageStream",
            ResourceKind::BuildConfig => "BuildConfig",
            ResourceKind::DeploymentConfig => "DeploymentConfig",
            ResourceKind::Route => "Route",
        }
    }

    /// The `apiVersion` field of manifests of this type.
    pub fn api_version(&self) -> &'static str {
        match self {
            ResourceKind::ProjectRequest | ResourceKind::Project => "project.openshift.io/v1",
            ResourceKind::ImageStream => "image.openshift.io/v1",
            ResourceKind::BuildConfig => "build.openshift.io/v1",
            ResourceKind::DeploymentConfig => "apps.openshift.io/v1",
            ResourceKind::Route => "route.openshift.io/v1",
            _ => "v1",
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespaces",
            ResourceKind::ProjectRequest => "projectrequests",
            ResourceKind::Project => "projects",
            ResourceKind::ConfigMap => "configmaps",
            ResourceKind::Secret => "secrets",
            ResourceKind::ServiceAccount => "serviceaccounts",
            ResourceKind::Service => "services",
            ResourceKind::Pod => "pods",
            ResourceKind::ImageStream => "imagestreams",
            ResourceKind::BuildConfig => "buildconfigs",
            ResourceKind::DeploymentConfig => "deploymentconfigs",
            ResourceKind::Route => "routes",
        }
    }

    /// Cluster-scoped kinds live outside any namespace path.
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(
            self,
            ResourceKind::Namespace | ResourceKind::ProjectRequest | ResourceKind::Project
        )
    }

    fn api_root(&self) -> String {
        match self.api_version() {
            "v1" => "/api/v1".to_string(),
            group_version => format!("/apis/{group_version}"),
        }
    }

    /// Path of the collection endpoint, used for creation and listing.
    pub fn collection_path(&self, namespace: &NamespaceName) -> String {
        if self.is_cluster_scoped() {
            format!("{}/{}", self.api_root(), self.plural())
        } else {
            format!(
                "{}/namespaces/{}/{}",
                self.api_root(),
                urlencoding::encode(namespace.as_str()),
                self.plural()
            )
        }
    }

    /// Path of a single named object.
    pub fn item_path(&self, namespace: &NamespaceName, name: &str) -> String {
        format!(
            "{}/{}",
            self.collection_path(namespace),
            urlencoding::encode(name)
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}
