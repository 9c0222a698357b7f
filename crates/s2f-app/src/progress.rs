use s2f_core::{RunHandle, RunMode, RunStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Timeseries,
    Sweep,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Timeseries => f.write_str("timeseries"),
            ArtifactKind::Sweep => f.write_str("sweep"),
        }
    }
}

/// Observable change applied by the orchestrator, in application order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Submitted { mode: RunMode, fingerprint: String },
    Created { handle: RunHandle },
    Status(RunStatus),
    TimeseriesReady { rows: usize, columns: usize },
    SweepReady { rows: usize },
    SweepAbsent,
    ArtifactFailed { artifact: ArtifactKind, message: String },
    Failed { message: String },
    Reset,
}
