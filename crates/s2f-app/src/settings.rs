//! Client settings file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::AppResult;
use crate::orchestrator::OrchestratorConfig;

/// Connection and polling settings, read from YAML. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub request_timeout_s: u64,
    pub poll_interval_ms: u64,
    /// Consecutive failed status polls tolerated before the run is failed.
    pub max_poll_failures: u32,
    /// Upper bound on polling one run; `null` polls until a terminal state.
    pub max_poll_duration_s: Option<u64>,
    pub auto_fetch: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_s: 30,
            poll_interval_ms: 1000,
            max_poll_failures: 30,
            max_poll_duration_s: Some(3600),
            auto_fetch: true,
        }
    }
}

impl ClientSettings {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s)
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_failures: self.max_poll_failures,
            max_poll_duration: self.max_poll_duration_s.map(Duration::from_secs),
            auto_fetch: self.auto_fetch,
        }
    }
}
