//! Run lifecycle orchestration.
//!
//! A `RunOrchestrator` owns one simulation run at a time: it submits the
//! request, polls the run status on a fixed cadence until the run is `done`
//! or `error`, then fetches the run's time series and sweep exactly once.
//!
//! The orchestrator never blocks on the service. Backend calls run on a
//! worker thread; replies are applied only inside [`RunOrchestrator::tick`],
//! which the caller drives from its own loop. Every job carries the
//! generation and handle it was issued under, and replies from a superseded
//! run are dropped before they can touch state.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use s2f_core::{
    FullConfig, RunHandle, RunMode, RunOptions, RunRequest, RunState, RunStatus,
    config_fingerprint,
};
use s2f_results::{SweepArtifact, TimeseriesArtifact};

use crate::backend::{RunBackend, SweepFetch};
use crate::progress::{ArtifactKind, RunEvent};
use crate::worker::{BackendWorker, Job, Reply, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run.
    Idle,
    /// Create-run call outstanding.
    Submitting,
    /// Status is `queued` or `running`.
    Polling,
    /// Status is `done`; artifacts may be fetched.
    Succeeded,
    Failed,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Succeeded | RunPhase::Failed)
    }
}

/// Cache slot for one artifact of the current run.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactState<T> {
    NotRequested,
    Pending,
    Ready(T),
    /// The service has no such artifact for this run.
    Absent,
    Failed(String),
}

impl<T> ArtifactState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ArtifactState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ArtifactState::Pending)
    }

    fn needs_request(&self, retry_failed: bool) -> bool {
        match self {
            ArtifactState::NotRequested => true,
            ArtifactState::Failed(_) => retry_failed,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub poll_interval: Duration,
    /// Consecutive status-poll transport failures tolerated; one more fails the run.
    pub max_poll_failures: u32,
    /// `None` polls until the service reports a terminal state.
    pub max_poll_duration: Option<Duration>,
    /// Fetch both artifacts as soon as the run is `done`.
    pub auto_fetch: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_poll_failures: 30,
            max_poll_duration: Some(Duration::from_secs(3600)),
            auto_fetch: true,
        }
    }
}

#[derive(Debug, Default)]
struct PollSchedule {
    in_flight: bool,
    next_due: Option<Instant>,
    started_at: Option<Instant>,
    consecutive_failures: u32,
}

pub struct RunOrchestrator {
    config: OrchestratorConfig,
    worker: BackendWorker,
    generation: u64,
    phase: RunPhase,
    mode: Option<RunMode>,
    fingerprint: Option<String>,
    handle: Option<RunHandle>,
    status: Option<RunStatus>,
    /// Why the run itself failed.
    run_error: Option<String>,
    /// `run_error`, else the first artifact slot still `Failed`.
    error: Option<String>,
    timeseries: ArtifactState<TimeseriesArtifact>,
    sweep: ArtifactState<SweepArtifact>,
    poll: PollSchedule,
    pending: VecDeque<Reply>,
    events: Vec<RunEvent>,
}

impl RunOrchestrator {
    pub fn new(backend: Arc<dyn RunBackend>, config: OrchestratorConfig) -> Self {
        Self {
            config,
            worker: BackendWorker::start(backend),
            generation: 0,
            phase: RunPhase::Idle,
            mode: None,
            fingerprint: None,
            handle: None,
            status: None,
            run_error: None,
            error: None,
            timeseries: ArtifactState::NotRequested,
            sweep: ArtifactState::NotRequested,
            poll: PollSchedule::default(),
            pending: VecDeque::new(),
            events: Vec::new(),
        }
    }

    pub fn with_backend<B: RunBackend + 'static>(backend: B, config: OrchestratorConfig) -> Self {
        Self::new(Arc::new(backend), config)
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    pub fn run_single(&mut self, config: FullConfig, options: RunOptions) {
        self.submit(RunRequest::single(config, options));
    }

    pub fn run_sweep(&mut self, config: FullConfig, options: RunOptions) {
        self.submit(RunRequest::sweep(config, options));
    }

    /// Start a new run, superseding any current one.
    ///
    /// Cached artifacts and the previous error are dropped before the
    /// create-run call is even issued.
    pub fn submit(&mut self, request: RunRequest) {
        if self.phase == RunPhase::Submitting || self.phase == RunPhase::Polling {
            tracing::warn!(
                previous = ?self.handle,
                "submitting while a run is live; the previous run is abandoned"
            );
        }
        self.clear_run();
        self.phase = RunPhase::Submitting;

        let fingerprint = config_fingerprint(&request);
        tracing::info!(mode = %request.mode, %fingerprint, "submitting run");
        self.mode = Some(request.mode);
        self.fingerprint = Some(fingerprint.clone());
        self.events.push(RunEvent::Submitted {
            mode: request.mode,
            fingerprint,
        });

        let ticket = self.ticket();
        self.send(Job::Create { ticket, request });
    }

    /// Forget the current run entirely.
    pub fn reset(&mut self) {
        tracing::info!(handle = ?self.handle, "reset");
        self.clear_run();
        self.phase = RunPhase::Idle;
        self.events.push(RunEvent::Reset);
    }

    /// Cached time series, or `None` while it is not available yet.
    ///
    /// Issues the fetch when the run is `done` and nothing is cached or in
    /// flight. A failed earlier fetch is retried.
    pub fn fetch_timeseries(&mut self) -> Option<&TimeseriesArtifact> {
        self.request_artifact(ArtifactKind::Timeseries, true);
        self.timeseries.ready()
    }

    /// Cached sweep, or `None` when not fetched yet or absent for this run.
    pub fn fetch_sweep(&mut self) -> Option<&SweepArtifact> {
        self.request_artifact(ArtifactKind::Sweep, true);
        self.sweep.ready()
    }

    // ---------------------------------------------------------------------
    // Driving
    // ---------------------------------------------------------------------

    /// Apply every reply that has arrived, then issue whatever is due.
    pub fn tick(&mut self, now: Instant) {
        while let Some(reply) = self.next_reply() {
            self.apply(reply, now);
        }
        self.schedule(now);
    }

    /// Block until one reply arrives or `timeout` passes. The reply is
    /// buffered and applied by the next [`tick`](Self::tick).
    pub fn await_reply(&mut self, timeout: Duration) -> bool {
        match self.worker.wait_reply(timeout) {
            Some(reply) => {
                self.pending.push_back(reply);
                true
            }
            None => false,
        }
    }

    pub fn take_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------------
    // View
    // ---------------------------------------------------------------------

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn handle(&self) -> Option<&RunHandle> {
        self.handle.as_ref()
    }

    pub fn mode(&self) -> Option<RunMode> {
        self.mode
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn status(&self) -> Option<&RunStatus> {
        self.status.as_ref()
    }

    /// True iff the run is still being polled and its latest status is
    /// `queued` or `running`.
    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Polling && self.status.as_ref().is_some_and(RunStatus::is_active)
    }

    pub fn timeseries(&self) -> Option<&TimeseriesArtifact> {
        self.timeseries.ready()
    }

    pub fn sweep(&self) -> Option<&SweepArtifact> {
        self.sweep.ready()
    }

    pub fn timeseries_state(&self) -> &ArtifactState<TimeseriesArtifact> {
        &self.timeseries
    }

    pub fn sweep_state(&self) -> &ArtifactState<SweepArtifact> {
        &self.sweep
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Nothing left to do until the caller issues a new command.
    pub fn is_settled(&self) -> bool {
        if self.phase == RunPhase::Succeeded {
            let outstanding = self.timeseries.is_pending() || self.sweep.is_pending();
            let unrequested = self.config.auto_fetch
                && (matches!(self.timeseries, ArtifactState::NotRequested)
                    || matches!(self.sweep, ArtifactState::NotRequested));
            return !outstanding && !unrequested;
        }
        self.phase == RunPhase::Idle || self.phase.is_terminal()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn clear_run(&mut self) {
        self.generation += 1;
        self.mode = None;
        self.fingerprint = None;
        self.handle = None;
        self.status = None;
        self.run_error = None;
        self.error = None;
        self.timeseries = ArtifactState::NotRequested;
        self.sweep = ArtifactState::NotRequested;
        self.poll = PollSchedule::default();
        self.pending.clear();
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            handle: self.handle.clone(),
        }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && ticket.handle == self.handle
    }

    fn next_reply(&mut self) -> Option<Reply> {
        self.pending
            .pop_front()
            .or_else(|| self.worker.try_reply())
    }

    fn send(&mut self, job: Job) {
        if let Err(err) = self.worker.dispatch(job) {
            self.fail(err.to_string());
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(handle = ?self.handle, %message, "run failed");
        self.phase = RunPhase::Failed;
        self.poll.in_flight = false;
        self.run_error = Some(message.clone());
        self.refresh_error();
        self.events.push(RunEvent::Failed { message });
    }

    fn refresh_error(&mut self) {
        let failed_fetch = |artifact: ArtifactKind, message: &str| {
            format!("Failed to fetch {}: {}", artifact, message)
        };
        self.error = self.run_error.clone().or_else(|| {
            match (&self.timeseries, &self.sweep) {
                (ArtifactState::Failed(message), _) => {
                    Some(failed_fetch(ArtifactKind::Timeseries, message))
                }
                (_, ArtifactState::Failed(message)) => {
                    Some(failed_fetch(ArtifactKind::Sweep, message))
                }
                _ => None,
            }
        });
    }

    fn apply(&mut self, reply: Reply, now: Instant) {
        if !self.is_current(reply.ticket()) {
            tracing::warn!(ticket = ?reply.ticket(), "discarding reply for a superseded run");
            return;
        }

        match reply {
            Reply::Created { result, .. } => {
                if self.phase != RunPhase::Submitting {
                    return;
                }
                match result {
                    Ok(handle) => {
                        tracing::info!(%handle, "run created");
                        self.handle = Some(handle.clone());
                        self.status = Some(RunStatus::queued());
                        self.phase = RunPhase::Polling;
                        self.poll.started_at = Some(now);
                        self.poll.next_due = Some(now);
                        self.events.push(RunEvent::Created { handle });
                    }
                    Err(err) => self.fail(format!("Failed to create run: {}", err)),
                }
            }
            Reply::Status { result, .. } => {
                self.poll.in_flight = false;
                if self.phase != RunPhase::Polling {
                    return;
                }
                match result {
                    Ok(status) => {
                        self.poll.consecutive_failures = 0;
                        self.apply_status(status);
                    }
                    Err(err) => {
                        self.poll.consecutive_failures += 1;
                        tracing::warn!(
                            failures = self.poll.consecutive_failures,
                            error = %err,
                            "status poll failed; retrying on next tick"
                        );
                        if self.poll.consecutive_failures > self.config.max_poll_failures {
                            self.fail(format!(
                                "Status polling failed {} times in a row: {}",
                                self.poll.consecutive_failures, err
                            ));
                        }
                    }
                }
            }
            Reply::Timeseries { result, .. } => match result {
                Ok(timeseries) => {
                    let (rows, columns) = timeseries.shape();
                    tracing::debug!(rows, columns, "timeseries fetched");
                    self.timeseries = ArtifactState::Ready(timeseries);
                    self.refresh_error();
                    self.events.push(RunEvent::TimeseriesReady { rows, columns });
                }
                Err(err) => self.artifact_failed(ArtifactKind::Timeseries, err.to_string()),
            },
            Reply::Sweep { fetch, .. } => match fetch {
                SweepFetch::Found(sweep) => {
                    let rows = sweep.rows.len();
                    tracing::debug!(rows, "sweep fetched");
                    self.sweep = ArtifactState::Ready(sweep);
                    self.refresh_error();
                    self.events.push(RunEvent::SweepReady { rows });
                }
                SweepFetch::Absent => {
                    tracing::debug!("run has no sweep");
                    self.sweep = ArtifactState::Absent;
                    self.refresh_error();
                    self.events.push(RunEvent::SweepAbsent);
                }
                SweepFetch::Failed(message) => self.artifact_failed(ArtifactKind::Sweep, message),
            },
        }
    }

    fn apply_status(&mut self, status: RunStatus) {
        tracing::debug!(
            state = %status.status,
            progress = status.progress,
            message = %status.message,
            "status"
        );
        let state = status.status;
        let message = status.message.clone();
        self.status = Some(status.clone());
        self.events.push(RunEvent::Status(status));

        match state {
            RunState::Queued | RunState::Running => {}
            RunState::Done => {
                tracing::info!(handle = ?self.handle, "run finished");
                self.phase = RunPhase::Succeeded;
            }
            RunState::Error => self.fail(message),
        }
    }

    fn artifact_failed(&mut self, artifact: ArtifactKind, message: String) {
        tracing::warn!(%artifact, %message, "artifact fetch failed");
        let slot_message = message.clone();
        match artifact {
            ArtifactKind::Timeseries => self.timeseries = ArtifactState::Failed(slot_message),
            ArtifactKind::Sweep => self.sweep = ArtifactState::Failed(slot_message),
        }
        self.refresh_error();
        self.events.push(RunEvent::ArtifactFailed { artifact, message });
    }

    fn schedule(&mut self, now: Instant) {
        match self.phase {
            RunPhase::Polling => self.schedule_poll(now),
            RunPhase::Succeeded if self.config.auto_fetch => {
                self.request_artifact(ArtifactKind::Timeseries, false);
                self.request_artifact(ArtifactKind::Sweep, false);
            }
            _ => {}
        }
    }

    fn schedule_poll(&mut self, now: Instant) {
        if let (Some(limit), Some(started)) = (self.config.max_poll_duration, self.poll.started_at) {
            if now.saturating_duration_since(started) >= limit {
                self.fail(format!("Run did not finish within {}s", limit.as_secs_f64()));
                return;
            }
        }

        if self.poll.in_flight {
            return;
        }
        if self.poll.next_due.is_some_and(|due| now < due) {
            return;
        }
        let Some(handle) = self.handle.clone() else {
            return;
        };

        self.poll.in_flight = true;
        self.poll.next_due = Some(now + self.config.poll_interval);
        let ticket = self.ticket();
        self.send(Job::Status { ticket, handle });
    }

    fn request_artifact(&mut self, artifact: ArtifactKind, retry_failed: bool) {
        if self.phase != RunPhase::Succeeded {
            return;
        }
        if self.status.as_ref().map(|s| s.status) != Some(RunState::Done) {
            return;
        }
        let Some(handle) = self.handle.clone() else {
            return;
        };

        let ticket = self.ticket();
        match artifact {
            ArtifactKind::Timeseries => {
                if !self.timeseries.needs_request(retry_failed) {
                    return;
                }
                self.timeseries = ArtifactState::Pending;
                self.send(Job::Timeseries { ticket, handle });
            }
            ArtifactKind::Sweep => {
                if !self.sweep.needs_request(retry_failed) {
                    return;
                }
                self.sweep = ArtifactState::Pending;
                self.send(Job::Sweep { ticket, handle });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use s2f_core::NumericMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Numbers its runs and finishes each on the first poll.
    struct CountingBackend {
        created: AtomicU32,
        fail_create: bool,
        state: RunState,
    }

    impl CountingBackend {
        fn finishing() -> Self {
            Self {
                created: AtomicU32::new(0),
                fail_create: false,
                state: RunState::Done,
            }
        }
    }

    fn run_number(handle: &RunHandle) -> f64 {
        handle
            .as_str()
            .trim_start_matches("run-")
            .parse()
            .unwrap_or(0.0)
    }

    impl RunBackend for CountingBackend {
        fn create_run(&self, _request: &RunRequest) -> AppResult<RunHandle> {
            if self.fail_create {
                return Err(AppError::Http {
                    status: 422,
                    detail: "pv.tilt_deg out of range".to_string(),
                });
            }
            let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(RunHandle::new(format!("run-{}", n)))
        }

        fn run_status(&self, handle: &RunHandle) -> AppResult<RunStatus> {
            let metrics: NumericMap = [("run".to_string(), run_number(handle))].into();
            Ok(RunStatus::new(self.state, 100, "").with_metrics(metrics))
        }

        fn timeseries(&self, handle: &RunHandle) -> AppResult<TimeseriesArtifact> {
            Ok(TimeseriesArtifact::new(
                vec![handle.to_string()],
                vec!["flops_step".to_string()],
                vec![vec![run_number(handle)]],
            )?)
        }

        fn sweep(&self, _handle: &RunHandle) -> SweepFetch {
            SweepFetch::Absent
        }
    }

    fn fast() -> OrchestratorConfig {
        OrchestratorConfig {
            poll_interval: Duration::ZERO,
            ..OrchestratorConfig::default()
        }
    }

    fn settle(orch: &mut RunOrchestrator) {
        for _ in 0..200 {
            orch.tick(Instant::now());
            if orch.is_settled() {
                return;
            }
            orch.await_reply(Duration::from_secs(2));
        }
        panic!("orchestrator did not settle; phase {:?}", orch.phase());
    }

    fn request() -> RunRequest {
        RunRequest::single(FullConfig::default(), RunOptions::default())
    }

    #[test]
    fn default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_poll_failures, 30);
        assert_eq!(config.max_poll_duration, Some(Duration::from_secs(3600)));
        assert!(config.auto_fetch);
    }

    #[test]
    fn fresh_orchestrator_is_idle() {
        let mut orch = RunOrchestrator::with_backend(CountingBackend::finishing(), fast());
        assert_eq!(orch.phase(), RunPhase::Idle);
        assert!(orch.is_settled());
        assert!(!orch.is_running());
        assert!(orch.fetch_timeseries().is_none());
        assert!(orch.fetch_sweep().is_none());
        assert_eq!(orch.timeseries_state(), &ArtifactState::NotRequested);
    }

    #[test]
    fn create_failure_fails_the_run() {
        let backend = CountingBackend {
            fail_create: true,
            ..CountingBackend::finishing()
        };
        let mut orch = RunOrchestrator::with_backend(backend, fast());
        orch.submit(request());
        settle(&mut orch);

        assert_eq!(orch.phase(), RunPhase::Failed);
        assert!(orch.handle().is_none());
        assert!(orch.status().is_none());
        let error = orch.error().unwrap();
        assert!(error.starts_with("Failed to create run"));
        assert!(error.contains("pv.tilt_deg out of range"));
    }

    #[test]
    fn submit_records_fingerprint() {
        let mut orch = RunOrchestrator::with_backend(CountingBackend::finishing(), fast());
        let req = request();
        let expected = config_fingerprint(&req);
        orch.submit(req);

        assert_eq!(orch.fingerprint(), Some(expected.as_str()));
        assert_eq!(orch.mode(), Some(RunMode::Single));
        assert_eq!(orch.phase(), RunPhase::Submitting);
        assert!(matches!(
            orch.take_events().as_slice(),
            [RunEvent::Submitted { mode: RunMode::Single, .. }]
        ));
    }

    #[test]
    fn stale_replies_never_touch_the_new_run() {
        let mut orch = RunOrchestrator::with_backend(CountingBackend::finishing(), fast());
        orch.submit(request());
        settle(&mut orch);
        assert_eq!(orch.handle(), Some(&RunHandle::new("run-1")));
        let old_ticket = orch.ticket();

        orch.submit(request());
        assert!(orch.timeseries().is_none());
        assert_eq!(orch.sweep_state(), &ArtifactState::NotRequested);
        settle(&mut orch);
        assert_eq!(orch.handle(), Some(&RunHandle::new("run-2")));
        assert_eq!(orch.status().unwrap().metric("run"), Some(2.0));

        let late = TimeseriesArtifact::new(
            vec!["run-1".to_string()],
            vec!["flops_step".to_string()],
            vec![vec![1.0]],
        )
        .unwrap();
        orch.pending.push_back(Reply::Timeseries {
            ticket: old_ticket.clone(),
            result: Ok(late),
        });
        orch.pending.push_back(Reply::Status {
            ticket: old_ticket,
            result: Ok(RunStatus::new(RunState::Error, 0, "old run failed")),
        });
        orch.take_events();
        orch.tick(Instant::now());

        assert!(orch.take_events().is_empty());
        assert_eq!(orch.timeseries().unwrap().labels(), ["run-2".to_string()]);
        assert_eq!(orch.phase(), RunPhase::Succeeded);
        assert!(orch.error().is_none());
    }

    #[test]
    fn reset_discards_everything() {
        let mut orch = RunOrchestrator::with_backend(CountingBackend::finishing(), fast());
        orch.submit(request());
        settle(&mut orch);
        assert!(orch.timeseries().is_some());
        let old_ticket = orch.ticket();

        orch.reset();
        assert_eq!(orch.phase(), RunPhase::Idle);
        assert!(orch.handle().is_none());
        assert!(orch.status().is_none());
        assert!(orch.timeseries().is_none());
        assert_eq!(orch.sweep_state(), &ArtifactState::NotRequested);
        assert!(orch.fingerprint().is_none());

        orch.pending.push_back(Reply::Sweep {
            ticket: old_ticket,
            fetch: SweepFetch::Absent,
        });
        orch.tick(Instant::now());
        assert_eq!(orch.sweep_state(), &ArtifactState::NotRequested);
        assert_eq!(orch.take_events().last(), Some(&RunEvent::Reset));
    }

    #[test]
    fn polling_duration_bound_fails_the_run() {
        let backend = CountingBackend {
            state: RunState::Running,
            ..CountingBackend::finishing()
        };
        let config = OrchestratorConfig {
            max_poll_duration: Some(Duration::ZERO),
            ..fast()
        };
        let mut orch = RunOrchestrator::with_backend(backend, config);
        orch.submit(request());
        settle(&mut orch);

        assert_eq!(orch.phase(), RunPhase::Failed);
        assert!(orch.error().unwrap().contains("did not finish within"));
        assert!(!orch.is_running());
        assert_eq!(orch.status().unwrap().status, RunState::Queued);
        assert_eq!(orch.timeseries_state(), &ArtifactState::NotRequested);
    }

    #[test]
    fn without_auto_fetch_artifacts_wait_for_the_caller() {
        let config = OrchestratorConfig {
            auto_fetch: false,
            ..fast()
        };
        let mut orch = RunOrchestrator::with_backend(CountingBackend::finishing(), config);
        orch.submit(request());
        settle(&mut orch);

        assert_eq!(orch.phase(), RunPhase::Succeeded);
        assert_eq!(orch.timeseries_state(), &ArtifactState::NotRequested);

        assert!(orch.fetch_timeseries().is_none());
        assert!(orch.timeseries_state().is_pending());
        // A second call while in flight issues nothing new.
        assert!(orch.fetch_timeseries().is_none());
        settle(&mut orch);
        assert!(orch.fetch_timeseries().is_some());
        assert_eq!(orch.sweep_state(), &ArtifactState::NotRequested);
    }
}
