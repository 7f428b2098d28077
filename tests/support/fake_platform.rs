// ABOUTME: In-memory platform that simulates a single namespace.
// ABOUTME: Scripted pod phases, create conflicts and delete failures; records every call.

use async_trait::async_trait;
use deployprobe::ledger::{ATTEMPTS_KEY, LEDGER_NAME};
use deployprobe::lifecycle::topology;
use deployprobe::manifest::Manifest;
use deployprobe::platform::{
    Platform, PlatformError, PodInfo, PodList, PodPhase, ResourceKind,
};
use deployprobe::types::{NamespaceName, PodName};
use parking_lot::{Mutex, MutexGuard};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};

pub const APP_POD: &str = "check-website-dc-1-x7k2p";
pub const DEPLOYER_POD: &str = "check-website-dc-1-deploy";
pub const BUILD_NODE: &str = "worker-1";
pub const APP_NODE: &str = "worker-2";

/// Mutable simulation state. Tests tweak it through `FakePlatform::state`.
pub struct FakeState {
    pub namespace_exists: bool,
    /// Existence checks that still report the namespace after a delete.
    pub delete_lag: u32,
    pending_delete: Option<u32>,
    pub resources: HashMap<(ResourceKind, String), Value>,
    /// Project requests answered with 409 before one succeeds.
    pub create_conflicts: u32,
    pub fail_project_delete: bool,
    /// Deletes of these kinds answer 500.
    pub failing_deletes: HashSet<ResourceKind>,
    /// Deletes of these kinds answer 500 but still remove the object.
    pub lossy_deletes: HashSet<ResourceKind>,
    /// Build pod phases per pod listing; the last one repeats.
    pub build_phases: VecDeque<PodPhase>,
    /// App pod phases per pod listing; the last one repeats.
    pub app_phases: VecDeque<PodPhase>,
    /// Pod listings after the rollout in which the app pod is not yet scheduled.
    pub app_pod_delay: u32,
    pub build_started: bool,
    pub deploy_started: bool,
    pub calls: Vec<String>,
}

pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    /// A cluster where the namespace does not exist yet and everything
    /// succeeds quickly.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                namespace_exists: false,
                delete_lag: 2,
                pending_delete: None,
                resources: HashMap::new(),
                create_conflicts: 0,
                fail_project_delete: false,
                failing_deletes: HashSet::new(),
                lossy_deletes: HashSet::new(),
                build_phases: VecDeque::from([
                    PodPhase::Pending,
                    PodPhase::Running,
                    PodPhase::Succeeded,
                ]),
                app_phases: VecDeque::from([PodPhase::Pending, PodPhase::Running]),
                app_pod_delay: 1,
                build_started: false,
                deploy_started: false,
                calls: Vec::new(),
            }),
        }
    }

    /// A namespace left behind by an earlier run, with the given raw ledger
    /// value (`None` for no ledger at all) and every probe resource present.
    pub fn with_existing_namespace(ledger: Option<&str>) -> Self {
        let platform = Self::new();
        {
            let mut state = platform.state();
            state.namespace_exists = true;
            seed_namespace(&mut state);
            if let Some(raw) = ledger {
                state.resources.insert(
                    (ResourceKind::ConfigMap, LEDGER_NAME.to_string()),
                    json!({"metadata": {"name": LEDGER_NAME}, "data": {"attempts": raw}}),
                );
            }
            for (kind, name) in [
                (ResourceKind::Route, topology::ROUTE),
                (ResourceKind::Service, topology::SERVICE),
                (ResourceKind::DeploymentConfig, topology::DEPLOYMENT_CONFIG),
                (ResourceKind::BuildConfig, topology::BUILD_CONFIG),
                (ResourceKind::ImageStream, topology::IMAGE_STREAM),
                (ResourceKind::Secret, topology::DEPLOY_SECRET),
            ] {
                state
                    .resources
                    .insert((kind, name.to_string()), json!({"metadata": {"name": name}}));
            }
            link_in_place(&mut state, topology::DEPLOY_SECRET);
        }
        platform
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| *c == call).count()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.state().calls.iter().position(|c| c == call)
    }

    /// Raw ledger value, if the ledger exists.
    pub fn ledger(&self) -> Option<String> {
        self.state()
            .resources
            .get(&(ResourceKind::ConfigMap, LEDGER_NAME.to_string()))
            .and_then(|cm| cm.get("data"))
            .and_then(|data| data.get(ATTEMPTS_KEY))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn has_resource(&self, kind: ResourceKind, name: &str) -> bool {
        self.state()
            .resources
            .contains_key(&(kind, name.to_string()))
    }

    /// Secrets linked on the builder service account.
    pub fn builder_secrets(&self) -> Vec<String> {
        self.state()
            .resources
            .get(&(
                ResourceKind::ServiceAccount,
                topology::BUILDER_SERVICE_ACCOUNT.to_string(),
            ))
            .and_then(|sa| sa.get("secrets"))
            .and_then(Value::as_array)
            .map(|secrets| {
                secrets
                    .iter()
                    .filter_map(|s| s.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn seed_namespace(state: &mut FakeState) {
    state.resources.clear();
    state.resources.insert(
        (
            ResourceKind::ServiceAccount,
            topology::BUILDER_SERVICE_ACCOUNT.to_string(),
        ),
        json!({
            "metadata": {"name": topology::BUILDER_SERVICE_ACCOUNT},
            "secrets": [{"name": "builder-dockercfg-abcde"}]
        }),
    );
}

fn link_in_place(state: &mut FakeState, secret: &str) {
    if let Some(secrets) = state
        .resources
        .get_mut(&(
            ResourceKind::ServiceAccount,
            topology::BUILDER_SERVICE_ACCOUNT.to_string(),
        ))
        .and_then(|sa| sa.get_mut("secrets"))
        .and_then(Value::as_array_mut)
    {
        secrets.push(json!({"name": secret}));
    }
}

fn next_phase(script: &mut VecDeque<PodPhase>) -> PodPhase {
    if script.len() > 1 {
        script.pop_front().unwrap_or(PodPhase::Pending)
    } else {
        script.front().cloned().unwrap_or(PodPhase::Pending)
    }
}

fn status_error(method: &'static str, kind: ResourceKind, name: &str, status: StatusCode) -> PlatformError {
    PlatformError::http(method, format!("{kind}/{name}"), status)
}

#[async_trait]
impl Platform for FakePlatform {
    async fn namespace_exists(&self, _namespace: &NamespaceName) -> Result<bool, PlatformError> {
        let mut state = self.state();
        state.calls.push("exists".to_string());
        if let Some(remaining) = state.pending_delete {
            if remaining == 0 {
                state.namespace_exists = false;
                state.pending_delete = None;
                state.resources.clear();
            } else {
                state.pending_delete = Some(remaining - 1);
            }
        }
        Ok(state.namespace_exists)
    }

    async fn create_resource(
        &self,
        _namespace: &NamespaceName,
        manifest: &Manifest,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        let kind = manifest.kind();
        let name = manifest.name().to_string();
        state.calls.push(format!("create {kind} {name}"));

        if kind == ResourceKind::ProjectRequest {
            if state.create_conflicts > 0 || state.namespace_exists {
                state.create_conflicts = state.create_conflicts.saturating_sub(1);
                return Err(status_error("POST", kind, &name, StatusCode::CONFLICT));
            }
            state.namespace_exists = true;
            seed_namespace(&mut state);
            return Ok(());
        }

        let key = (kind, name.clone());
        if state.resources.contains_key(&key) {
            return Err(status_error("POST", kind, &name, StatusCode::CONFLICT));
        }
        state.resources.insert(key, manifest.body().clone());
        Ok(())
    }

    async fn get_resource(
        &self,
        kind: ResourceKind,
        _namespace: &NamespaceName,
        name: &str,
    ) -> Result<Value, PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("get {kind} {name}"));
        state
            .resources
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| status_error("GET", kind, name, StatusCode::NOT_FOUND))
    }

    async fn replace_resource(
        &self,
        kind: ResourceKind,
        _namespace: &NamespaceName,
        name: &str,
        body: &Value,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("replace {kind} {name}"));
        state.resources.insert((kind, name.to_string()), body.clone());
        Ok(())
    }

    async fn patch_resource(
        &self,
        kind: ResourceKind,
        _namespace: &NamespaceName,
        name: &str,
        patch: &Value,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("patch {kind} {name}"));
        let Some(existing) = state.resources.get_mut(&(kind, name.to_string())) else {
            return Err(status_error("PATCH", kind, name, StatusCode::NOT_FOUND));
        };
        if let (Some(target), Some(source)) = (existing.as_object_mut(), patch.as_object()) {
            for (key, value) in source {
                match (target.get_mut(key), value) {
                    (Some(Value::Object(into)), Value::Object(from)) => {
                        for (k, v) in from {
                            into.insert(k.clone(), v.clone());
                        }
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete_resource(
        &self,
        kind: ResourceKind,
        _namespace: &NamespaceName,
        name: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.calls.push(format!("delete {kind} {name}"));

        if kind == ResourceKind::Project {
            if state.fail_project_delete {
                return Err(status_error(
                    "DELETE",
                    kind,
                    name,
                    StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            if !state.namespace_exists {
                return Err(status_error("DELETE", kind, name, StatusCode::NOT_FOUND));
            }
            if state.pending_delete.is_none() {
                state.pending_delete = Some(state.delete_lag);
            }
            return Ok(());
        }

        if state.failing_deletes.contains(&kind) {
            return Err(status_error(
                "DELETE",
                kind,
                name,
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        match state.resources.remove(&(kind, name.to_string())) {
            Some(_) if state.lossy_deletes.contains(&kind) => Err(status_error(
                "DELETE",
                kind,
                name,
                StatusCode::INTERNAL_SERVER_ERROR,
            )),
            Some(_) => Ok(()),
            None => Err(status_error("DELETE", kind, name, StatusCode::NOT_FOUND)),
        }
    }

    async fn instantiate(
        &self,
        _namespace: &NamespaceName,
        request: &Manifest,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        let kind = request.kind();
        state.calls.push(format!("instantiate {kind} {}", request.name()));
        match kind {
            ResourceKind::BuildConfig => state.build_started = true,
            ResourceKind::DeploymentConfig => state.deploy_started = true,
            _ => {}
        }
        Ok(())
    }

    async fn list_pods(&self, _namespace: &NamespaceName) -> Result<PodList, PlatformError> {
        let mut state = self.state();
        state.calls.push("list pods".to_string());

        let mut pods = Vec::new();
        if state.build_started {
            let phase = next_phase(&mut state.build_phases);
            pods.push(PodInfo {
                name: topology::first_build().pod_name(),
                phase,
                node: BUILD_NODE.to_string(),
            });
        }
        if state.deploy_started {
            pods.push(PodInfo {
                name: PodName::new(DEPLOYER_POD),
                phase: PodPhase::Running,
                node: APP_NODE.to_string(),
            });
            if state.app_pod_delay > 0 {
                state.app_pod_delay -= 1;
            } else {
                let phase = next_phase(&mut state.app_phases);
                pods.push(PodInfo {
                    name: PodName::new(APP_POD),
                    phase,
                    node: APP_NODE.to_string(),
                });
            }
        }
        Ok(PodList::new(pods))
    }
}
