// ABOUTME: Resource manifest builders, one function per resource kind.
// ABOUTME: Each builder returns a Manifest tagged with its ResourceKind.

mod openshift;

pub use openshift::{
    BuildConfigParams, DeploymentConfigParams, RouteParams, build_config, build_request,
    deployment_config, deployment_request, image_stream, project_request, route,
};

use crate::platform::ResourceKind;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Annotation value stamped on every generated object.
pub const GENERATED_BY: &str = "deployprobe";

/// A manifest ready to be sent to the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    kind: ResourceKind,
    name: String,
    body: Value,
}

impl Manifest {
    fn new(kind: ResourceKind, name: impl Into<String>, body: Value) -> Self {
        Self {
            kind,
            name: name.into(),
            body,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

fn labelled_metadata(name: &str, app: &str) -> Value {
    json!({
        "name": name,
        "annotations": {"openshift.io/generated-by": GENERATED_BY},
        "labels": {"app": app},
    })
}

/// ConfigMap holding string data.
pub fn config_map(name: &str, data: &BTreeMap<String, String>) -> Manifest {
    let kind = ResourceKind::ConfigMap;
    Manifest::new(
        kind,
        name,
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": {"name": name},
            "data": data,
        }),
    )
}

/// Opaque secret carrying an SSH private key for source checkout.
pub fn ssh_key_secret(name: &str, private_key: &str) -> Manifest {
    let kind = ResourceKind::Secret;
    Manifest::new(
        kind,
        name,
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": {"name": name},
            "data": {"ssh-privatekey": STANDARD.encode(private_key.as_bytes())},
        }),
    )
}

/// Service exposing `port` of the pods of one deployment config.
pub fn service(name: &str, app: &str, port: u16, deployment_config: &str) -> Manifest {
    let kind = ResourceKind::Service;
    Manifest::new(
        kind,
        name,
        json!({
            "kind": kind.kind_name(),
            "apiVersion": kind.api_version(),
            "metadata": labelled_metadata(name, app),
            "spec": {
                "ports": [{
                    "name": port_name(port),
                    "port": port,
                    "protocol": "TCP",
                    "targetPort": port,
                }],
                "selector": {
                    "app": app,
                    "deploymentconfig": deployment_config,
                },
            },
        }),
    )
}

/// Service port names follow the `<port>-tcp` convention.
pub fn port_name(port: u16) -> String {
    format!("{port}-tcp")
}
