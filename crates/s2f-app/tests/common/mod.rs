//! In-memory `RunBackend` driven by a script of status replies.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use s2f_app::{AppError, AppResult, OrchestratorConfig, RunBackend, RunOrchestrator, SweepFetch};
use s2f_core::{NumericMap, RunHandle, RunRequest, RunState, RunStatus};
use s2f_results::{SweepArtifact, TimeseriesArtifact};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create,
    Status(RunHandle),
    Timeseries(RunHandle),
    Sweep(RunHandle),
}

#[derive(Default)]
struct Script {
    create: VecDeque<AppResult<()>>,
    statuses: VecDeque<AppResult<RunStatus>>,
    timeseries: VecDeque<AppResult<TimeseriesArtifact>>,
    sweeps: VecDeque<SweepFetch>,
    calls: Vec<Call>,
}

/// Cloneable handle to a shared script; clones see the same queues and call log.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(&self, detail: &str) -> &Self {
        self.script.lock().unwrap().create.push_back(Err(AppError::Http {
            status: 422,
            detail: detail.to_string(),
        }));
        self
    }

    pub fn status(&self, status: RunStatus) -> &Self {
        self.script.lock().unwrap().statuses.push_back(Ok(status));
        self
    }

    pub fn status_failure(&self, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .statuses
            .push_back(Err(AppError::Transport(message.to_string())));
        self
    }

    pub fn timeseries(&self, result: AppResult<TimeseriesArtifact>) -> &Self {
        self.script.lock().unwrap().timeseries.push_back(result);
        self
    }

    pub fn sweep(&self, fetch: SweepFetch) -> &Self {
        self.script.lock().unwrap().sweeps.push_back(fetch);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

impl RunBackend for ScriptedBackend {
    fn create_run(&self, _request: &RunRequest) -> AppResult<RunHandle> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Create);
        match script.create.pop_front() {
            Some(Err(err)) => Err(err),
            _ => Ok(RunHandle::new(uuid::Uuid::new_v4().to_string())),
        }
    }

    fn run_status(&self, handle: &RunHandle) -> AppResult<RunStatus> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Status(handle.clone()));
        script.statuses.pop_front().unwrap_or_else(|| {
            Err(AppError::Backend {
                message: "status script exhausted".to_string(),
            })
        })
    }

    fn timeseries(&self, handle: &RunHandle) -> AppResult<TimeseriesArtifact> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Timeseries(handle.clone()));
        script
            .timeseries
            .pop_front()
            .unwrap_or_else(|| Ok(sample_timeseries()))
    }

    fn sweep(&self, handle: &RunHandle) -> SweepFetch {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Sweep(handle.clone()));
        script.sweeps.pop_front().unwrap_or(SweepFetch::Absent)
    }
}

pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        poll_interval: Duration::ZERO,
        ..OrchestratorConfig::default()
    }
}

pub fn done(metrics: &[(&str, f64)]) -> RunStatus {
    let metrics: NumericMap = metrics.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    RunStatus::new(RunState::Done, 100, "Simulation complete").with_metrics(metrics)
}

pub fn sample_timeseries() -> TimeseriesArtifact {
    TimeseriesArtifact::new(
        vec![
            "2021-01-01T00:00:00-06:00".to_string(),
            "2021-01-01T01:00:00-06:00".to_string(),
        ],
        vec!["P_pv_bus_w".to_string(), "flops_step".to_string()],
        vec![vec![0.0, 0.0], vec![120.5, 3.6e15]],
    )
    .expect("sample timeseries is rectangular")
}

/// Drive the orchestrator until it has nothing left to do.
pub fn settle(orch: &mut RunOrchestrator) {
    for _ in 0..500 {
        orch.tick(Instant::now());
        if orch.is_settled() {
            return;
        }
        orch.await_reply(Duration::from_secs(2));
    }
    panic!("orchestrator did not settle; phase {:?}", orch.phase());
}

/// Apply exactly one reply.
pub fn step(orch: &mut RunOrchestrator) {
    assert!(
        orch.await_reply(Duration::from_secs(2)),
        "expected a reply from the backend"
    );
    orch.tick(Instant::now());
}
