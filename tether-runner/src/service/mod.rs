//! Service layer
//!
//! Services contain the job lifecycle around the poller: submitting a job,
//! reporting progress, and materializing the finished result on disk.
//!
//! Progress reporting is trait-based so tests can observe every attempt.

mod materializer;
mod progress;
mod submission;

// Re-export traits
pub use progress::ProgressReporter;

// Re-export implementations
pub use materializer::{Materialized, Materializer, Provenance};
pub use progress::{RecordedProgress, SilentProgress};
pub use submission::Submitter;
