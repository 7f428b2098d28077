// ABOUTME: The fixed sample application the probe builds and deploys.
// ABOUTME: Resource names, source repository, and manifest parameters.

use crate::manifest::{self, Manifest};
use crate::types::{BuildName, NamespaceName, PodName};

pub const APP_NAME: &str = "check-website";
pub const DEPLOY_SECRET: &str = "deploy-key";
pub const BUILDER_SERVICE_ACCOUNT: &str = "builder";
pub const IMAGE_STREAM: &str = "check-website-is";
pub const IMAGE_TAG: &str = "check-website-is:latest";
pub const BUILD_CONFIG: &str = "check-website-bc";
pub const DEPLOYMENT_CONFIG: &str = "check-website-dc";
pub const SERVICE: &str = "check-website-svc";
pub const ROUTE: &str = "check-website-route";
pub const APP_PORT: u16 = 8080;
pub const SOURCE_GIT: &str = "https://github.com/tomwis97/phpinfo-test";
pub const BUILDER_IMAGE: &str = "php:7.4-ubi8";

pub fn image_stream() -> Manifest {
    manifest::image_stream(IMAGE_STREAM, APP_NAME)
}

pub fn build_config() -> Manifest {
    manifest::build_config(&manifest::BuildConfigParams {
        name: BUILD_CONFIG,
        app: APP_NAME,
        output_tag: IMAGE_TAG,
        git_uri: SOURCE_GIT,
        context_dir: "",
        source_secret: DEPLOY_SECRET,
        builder_image: BUILDER_IMAGE,
    })
}

pub fn deployment_config(namespace: &NamespaceName) -> Manifest {
    manifest::deployment_config(
        namespace,
        &manifest::DeploymentConfigParams {
            name: DEPLOYMENT_CONFIG,
            app: APP_NAME,
            image_tag: IMAGE_TAG,
            port: APP_PORT,
            replicas: 1,
        },
    )
}

pub fn service() -> Manifest {
    manifest::service(SERVICE, APP_NAME, APP_PORT, DEPLOYMENT_CONFIG)
}

pub fn route(host: &str) -> Manifest {
    manifest::route(&manifest::RouteParams {
        name: ROUTE,
        app: APP_NAME,
        service: SERVICE,
        target_port: &manifest::port_name(APP_PORT),
        host,
    })
}

/// Every run triggers exactly one build in a fresh build config.
pub fn first_build() -> BuildName {
    BuildName::numbered(BUILD_CONFIG, 1)
}

/// Pods of the deployment config, excluding its deployer pods.
pub fn is_app_pod(name: &PodName) -> bool {
    let name = name.as_str();
    name.contains(DEPLOYMENT_CONFIG) && !name.ends_with("deploy")
}
