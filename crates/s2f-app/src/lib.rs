//! Client application layer for sun2flops.
//!
//! This crate drives simulation runs against the sun2flops service:
//! submitting a run, polling it to completion, and fetching its result
//! artifacts. Frontends talk to [`RunOrchestrator`]; the service sits behind
//! the [`RunBackend`] trait, with [`HttpBackend`] as the REST implementation.

pub mod backend;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod progress;
pub mod settings;
mod worker;

// Re-export key types for convenience
pub use backend::{RunBackend, SweepFetch};
pub use error::{AppError, AppResult};
pub use http::{DOWNLOADABLE_ARTIFACTS, HealthStatus, HttpBackend};
pub use orchestrator::{ArtifactState, OrchestratorConfig, RunOrchestrator, RunPhase};
pub use progress::{ArtifactKind, RunEvent};
pub use settings::ClientSettings;
