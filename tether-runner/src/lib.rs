//! Tether Runner
//!
//! Submits jobs to remote providers and waits for them to finish.
//!
//! Architecture:
//! - Configuration: timing parameters passed explicitly to each component
//! - Services: submission with bounded retry, progress reporting, result materialization
//! - Scheduler: adaptive status polling with timeout and cancellation
//!
//! All job state lives at the provider. A job submitted by one process can be
//! awaited by another that knows only its id.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

pub use config::RunnerConfig;
pub use error::JobError;
pub use scheduler::AdaptivePoller;
pub use service::{
    Materialized, Materializer, ProgressReporter, Provenance, RecordedProgress, SilentProgress,
    Submitter,
};
