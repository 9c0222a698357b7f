//! Background thread that performs backend calls one at a time.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use s2f_core::{RunHandle, RunRequest, RunStatus};
use s2f_results::TimeseriesArtifact;

use crate::backend::{RunBackend, SweepFetch};
use crate::error::{AppError, AppResult};

/// Identity of the run a job was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub generation: u64,
    pub handle: Option<RunHandle>,
}

#[derive(Debug)]
pub(crate) enum Job {
    Create { ticket: Ticket, request: RunRequest },
    Status { ticket: Ticket, handle: RunHandle },
    Timeseries { ticket: Ticket, handle: RunHandle },
    Sweep { ticket: Ticket, handle: RunHandle },
}

#[derive(Debug)]
pub(crate) enum Reply {
    Created {
        ticket: Ticket,
        result: AppResult<RunHandle>,
    },
    Status {
        ticket: Ticket,
        result: AppResult<RunStatus>,
    },
    Timeseries {
        ticket: Ticket,
        result: AppResult<TimeseriesArtifact>,
    },
    Sweep {
        ticket: Ticket,
        fetch: SweepFetch,
    },
}

impl Reply {
    pub fn ticket(&self) -> &Ticket {
        match self {
            Reply::Created { ticket, .. }
            | Reply::Status { ticket, .. }
            | Reply::Timeseries { ticket, .. }
            | Reply::Sweep { ticket, .. } => ticket,
        }
    }
}

pub(crate) struct BackendWorker {
    job_tx: Sender<Job>,
    reply_rx: Receiver<Reply>,
    _handle: JoinHandle<()>,
}

impl BackendWorker {
    /// The thread exits once the worker is dropped.
    pub fn start(backend: Arc<dyn RunBackend>) -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (reply_tx, reply_rx) = channel();

        let handle = thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let reply = Self::execute(backend.as_ref(), job);
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
        });

        Self {
            job_tx,
            reply_rx,
            _handle: handle,
        }
    }

    fn execute(backend: &dyn RunBackend, job: Job) -> Reply {
        match job {
            Job::Create { ticket, request } => Reply::Created {
                ticket,
                result: backend.create_run(&request),
            },
            Job::Status { ticket, handle } => Reply::Status {
                ticket,
                result: backend.run_status(&handle),
            },
            Job::Timeseries { ticket, handle } => Reply::Timeseries {
                ticket,
                result: backend.timeseries(&handle),
            },
            Job::Sweep { ticket, handle } => Reply::Sweep {
                ticket,
                fetch: backend.sweep(&handle),
            },
        }
    }

    pub fn dispatch(&self, job: Job) -> AppResult<()> {
        self.job_tx.send(job).map_err(|_| AppError::WorkerStopped)
    }

    pub fn try_reply(&self) -> Option<Reply> {
        match self.reply_rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn wait_reply(&self, timeout: Duration) -> Option<Reply> {
        match self.reply_rx.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
