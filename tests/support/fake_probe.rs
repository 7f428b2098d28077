// ABOUTME: Scripted application probe.
// ABOUTME: Replays queued responses, then answers 200.

use async_trait::async_trait;
use deployprobe::probe::{AppProbe, ProbeError};
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Default)]
pub struct FakeProbe {
    responses: Mutex<VecDeque<Result<u16, ProbeError>>>,
    hosts: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with these statuses first, in order.
    pub fn with_statuses(statuses: &[u16]) -> Self {
        let probe = Self::new();
        probe
            .responses
            .lock()
            .extend(statuses.iter().map(|status| Ok(*status)));
        probe
    }

    pub fn push_error(&self, host: &str) {
        self.responses.lock().push_back(Err(ProbeError::Connect {
            host: host.to_string(),
            message: "connection refused".to_string(),
        }));
    }

    /// Hosts requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.hosts.lock().clone()
    }
}

#[async_trait]
impl AppProbe for FakeProbe {
    async fn get(&self, host: &str) -> Result<u16, ProbeError> {
        self.hosts.lock().push(host.to_string());
        self.responses.lock().pop_front().unwrap_or(Ok(200))
    }
}
