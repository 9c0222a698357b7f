//! The run-management service as seen by the orchestrator.

use s2f_core::{RunHandle, RunRequest, RunStatus};
use s2f_results::{SweepArtifact, TimeseriesArtifact};

use crate::error::AppResult;

/// Outcome of asking for a run's sweep.
///
/// `Absent` is a normal answer (single-mode runs have no sweep) and is kept
/// apart from `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepFetch {
    Found(SweepArtifact),
    Absent,
    Failed(String),
}

/// Operations the orchestrator needs from the simulation service.
///
/// Calls block; the orchestrator runs them on its worker thread.
pub trait RunBackend: Send + Sync {
    fn create_run(&self, request: &RunRequest) -> AppResult<RunHandle>;

    fn run_status(&self, handle: &RunHandle) -> AppResult<RunStatus>;

    /// Only meaningful once the run reports `done`.
    fn timeseries(&self, handle: &RunHandle) -> AppResult<TimeseriesArtifact>;

    /// Only meaningful once the run reports `done`.
    fn sweep(&self, handle: &RunHandle) -> SweepFetch;
}
