//! Provider traits
//!
//! The abstract contract between the job runner and a remote provider. The
//! runner never sees wire formats, auth headers or endpoint paths.

use async_trait::async_trait;
use tether_core::domain::job::{JobId, JobSnapshot};

use crate::error::Result;

/// Read-only access to remote job state
///
/// This is all a poller needs, so a job can be resumed from any process
/// holding nothing but its identifier.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Provider name used in provenance metadata and messages
    fn provider_name(&self) -> &str;

    /// Queries the current status of a job
    ///
    /// Errors for which [`crate::ClientError::is_transient`] holds may be
    /// retried on the caller's schedule.
    async fn get_status(&self, id: &JobId) -> Result<JobSnapshot>;
}

/// A provider that accepts new jobs
#[async_trait]
pub trait JobProvider: StatusSource {
    /// Validated request payload accepted by this provider
    type Request: Send + Sync;

    /// Sends a creation request and returns the identifier and initial status
    async fn submit(&self, request: &Self::Request) -> Result<JobSnapshot>;
}
