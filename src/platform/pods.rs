// ABOUTME: Pod snapshot types returned by pod listings.
// ABOUTME: Parses phases and node placement out of the raw PodList document.

use crate::types::PodName;
use serde_json::Value;
use std::fmt;

/// Lifecycle phase reported in `status.phase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
    /// Any other value, e.g. builder-specific error phases.
    Other(String),
}

impl PodPhase {
    pub fn parse(value: &str) -> Self {
        match value {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            "Unknown" => PodPhase::Unknown,
            other => PodPhase::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
            PodPhase::Other(s) => s,
        }
    }

    /// Terminal failure: `Failed` or any phase mentioning an error.
    pub fn is_errored(&self) -> bool {
        match self {
            PodPhase::Failed => true,
            PodPhase::Other(s) => s.contains("Error"),
            _ => false,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodInfo {
    pub name: PodName,
    pub phase: PodPhase,
    pub node: String,
}

/// Scheduled pods of a namespace, in API order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodList {
    pods: Vec<PodInfo>,
}

impl PodList {
    pub fn new(pods: Vec<PodInfo>) -> Self {
        Self { pods }
    }

    /// Parse a `PodList` document. Pods without `spec.nodeName` have not
    /// been scheduled yet and are left out.
    pub fn from_api(document: &Value) -> Result<Self, String> {
        let items = document
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| "pod list has no items array".to_string())?;

        let mut pods = Vec::with_capacity(items.len());
        for item in items {
            let Some(node) = item.pointer("/spec/nodeName").and_then(Value::as_str) else {
                continue;
            };
            let name = item
                .pointer("/metadata/name")
                .and_then(Value::as_str)
                .ok_or_else(|| "pod without metadata.name".to_string())?;
            let phase = item
                .pointer("/status/phase")
                .and_then(Value::as_str)
                .map(PodPhase::parse)
                .unwrap_or(PodPhase::Unknown);
            pods.push(PodInfo {
                name: PodName::new(name),
                phase,
                node: node.to_string(),
            });
        }

        Ok(Self { pods })
    }

    pub fn get(&self, name: &PodName) -> Option<&PodInfo> {
        self.pods.iter().find(|p| &p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PodInfo> {
        self.pods.iter()
    }

    pub fn len(&self) -> usize {
        self.pods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }
}
