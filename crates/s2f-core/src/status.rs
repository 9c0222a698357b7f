//! Run handle and run status types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numeric::{NumericMap, deserialize_opt_numeric_map};

/// Opaque identifier assigned by the service when a run is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunHandle(String);

impl RunHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RunHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Queued,
    Running,
    Done,
    Error,
}

impl RunState {
    /// `done` and `error` end a run; nothing is polled after them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Error)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Done => "done",
            RunState::Error => "error",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest status reported by the service for one run.
///
/// Always replaced as a whole; fields are never merged across polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub status: RunState,
    /// Percent complete, 0-100.
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub message: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_opt_numeric_map"
    )]
    pub metrics: Option<NumericMap>,
}

impl RunStatus {
    pub fn new(status: RunState, progress: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            progress,
            message: message.into(),
            metrics: None,
        }
    }

    pub fn queued() -> Self {
        Self::new(RunState::Queued, 0, "Run queued")
    }

    pub fn with_metrics(mut self, metrics: NumericMap) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Scalar metric reported with a finished run.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.as_ref()?.get(name).copied()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
