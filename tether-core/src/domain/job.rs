//! Job domain types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::status::ProviderStatus;

/// Opaque job identifier issued by a remote provider
///
/// The identifier alone is enough to resume observing a job from any process,
/// so it is immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in generated file names
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Normalized job state
///
/// Every provider vocabulary maps onto exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Succeeded,
    Failed,
}

impl JobState {
    /// Whether no further transition can occur
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Succeeded => write!(f, "succeeded"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Last observed view of a remote job
///
/// Returned both by submission and by status queries. The local process never
/// holds an authoritative copy; a snapshot is only what the provider said at
/// the time it was asked.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: ProviderStatus,
    /// Raw provider body. Carries the result once the job has succeeded.
    pub payload: Option<JsonValue>,
    /// Provider error detail, set when the job failed
    pub error: Option<String>,
}

impl JobSnapshot {
    pub fn new(id: impl Into<JobId>, status: ProviderStatus) -> Self {
        Self {
            id: id.into(),
            status,
            payload: None,
            error: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Normalized state of the job
    pub fn state(&self) -> JobState {
        self.status.normalize()
    }
}
