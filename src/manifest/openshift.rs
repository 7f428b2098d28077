// ABOUTME: Builders for OpenShift-specific resources and trigger requests.
// ABOUTME: Projects, image streams, build/deployment configs, routes.

use super::{Manifest, labelled_metadata};
use crate::platform::ResourceKind;
use crate::types::NamespaceName;
use serde_json::json;

/// Internal registry address that deployment configs pull from.
pub const INTERNAL_REGISTRY: &str = "image-registry.openshift-image-registry.svc:5000";

/// Request a new project with the given name.
pub fn project_request(namespace: &NamespaceName) -> Manifest {
    let kind = ResourceKind::ProjectRequest;
    Manifest::new(
        kind,
        namespace.as_str(),
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": {"name": namespace.as_str()},
        }),
    )
}

pub fn image_stream(name: &str, app: &str) -> Manifest {
    let kind = ResourceKind::ImageStream;
    Manifest::new(
        kind,
        name,
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": labelled_metadata(name, app),
            "spec": {"lookupPolicy": {"local": false}},
        }),
    )
}

/// Source-to-image build from a git repository.
#[derive(Debug, Clone)]
pub struct BuildConfigParams<'a> {
    pub name: &'a str,
    pub app: &'a str,
    /// Image stream tag the result is pushed to.
    pub output_tag: &'a str,
    pub git_uri: &'a str,
    pub context_dir: &'a str,
    pub source_secret: &'a str,
    /// Builder image stream tag in the `openshift` namespace.
    pub builder_image: &'a str,
}

pub fn build_config(params: &BuildConfigParams<'_>) -> Manifest {
    let kind = ResourceKind::BuildConfig;
    Manifest::new(
        kind,
        params.name,
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": labelled_metadata(params.name, params.app),
            "spec": {
                "output": {
                    "to": {"kind": "ImageStreamTag", "name": params.output_tag},
                },
                "postCommit": {},
                "resources": {},
                "source": {
                    "type": "Git",
                    "contextDir": params.context_dir,
                    "git": {"uri": params.git_uri},
                    "sourceSecret": {"name": params.source_secret},
                },
                "strategy": {
                    "type": "Source",
                    "sourceStrategy": {
                        "from": {
                            "kind": "ImageStreamTag",
                            "name": params.builder_image,
                            "namespace": "openshift",
                        },
                    },
                },
                "triggers": [],
            },
        }),
    )
}

#[derive(Debug, Clone)]
pub struct DeploymentConfigParams<'a> {
    pub name: &'a str,
    pub app: &'a str,
    /// Image stream tag inside the target namespace.
    pub image_tag: &'a str,
    pub port: u16,
    pub replicas: u32,
}

pub fn deployment_config(
    namespace: &NamespaceName,
    params: &DeploymentConfigParams<'_>,
) -> Manifest {
    let kind = ResourceKind::DeploymentConfig;
    let image = format!("{INTERNAL_REGISTRY}/{namespace}/{}", params.image_tag);
    Manifest::new(
        kind,
        params.name,
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": labelled_metadata(params.name, params.app),
            "spec": {
                "replicas": params.replicas,
                "selector": {
                    "app": params.app,
                    "deploymentconfig": params.name,
                },
                "strategy": {"resources": {}},
                "template": {
                    "metadata": {
                        "annotations": {"openshift.io/generated-by": super::GENERATED_BY},
                        "labels": {
                            "app": params.app,
                            "deploymentconfig": params.name,
                        },
                    },
                    "spec": {
                        "containers": [{
                            "name": format!("{}-pod", params.name),
                            "image": image,
                            "ports": [{"containerPort": params.port, "protocol": "TCP"}],
                            "resources": {},
                        }],
                    },
                },
                "test": false,
                "triggers": [],
            },
        }),
    )
}

#[derive(Debug, Clone)]
pub struct RouteParams<'a> {
    pub name: &'a str,
    pub app: &'a str,
    pub service: &'a str,
    pub target_port: &'a str,
    pub host: &'a str,
}

pub fn route(params: &RouteParams<'_>) -> Manifest {
    let kind = ResourceKind::Route;
    Manifest::new(
        kind,
        params.name,
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": {
                "name": params.name,
                "labels": {"app": params.app},
            },
            "spec": {
                "host": params.host,
                "port": {"targetPort": params.target_port},
                "to": {"kind": "Service", "name": params.service},
            },
        }),
    )
}

/// Instantiate request for a build config.
pub fn build_request(build_config: &str, triggered_by: &str) -> Manifest {
    Manifest::new(
        ResourceKind::BuildConfig,
        build_config,
        json!({
            "kind": "BuildRequest",
            "apiVersion": ResourceKind::BuildConfig.api_version(),
            "metadata": {"name": build_config},
            "triggeredBy": [{"message": triggered_by}],
            "dockerStrategyOptions": {},
            "sourceStrategyOptions": {},
        }),
    )
}

/// Instantiate request rolling out the latest deployment config version.
pub fn deployment_request(deployment_config: &str) -> Manifest {
    Manifest::new(
        ResourceKind::DeploymentConfig,
        deployment_config,
        json!({
            "kind": "DeploymentRequest",
            "apiVersion": ResourceKind::DeploymentConfig.api_version(),
            "name": deployment_config,
            "latest": true,
            "force": true,
        }),
    )
}
