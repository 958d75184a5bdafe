//! Job error taxonomy
//!
//! Every outcome other than success maps to one variant, and each variant to
//! its own process exit code so calling scripts can branch on the class of
//! failure. None of these errors leave remote state to clean up: after the
//! submission the runner only reads.

use std::time::Duration;
use tether_client::ClientError;
use tether_core::domain::job::JobId;
use tether_core::domain::schedule::format_elapsed;
use thiserror::Error;

/// Errors raised while submitting or waiting for a job
#[derive(Debug, Error)]
pub enum JobError {
    /// The provider refused the job, or could not be reached at all
    #[error("Submission to {provider} failed after {attempts} attempt(s)")]
    Submission {
        provider: String,
        attempts: u32,
        #[source]
        source: ClientError,
    },

    /// The provider reported a terminal failure
    #[error("Job {id} failed after {}: {detail}", fmt_duration(.elapsed))]
    JobFailed {
        id: JobId,
        detail: String,
        elapsed: Duration,
    },

    /// The local budget ran out; the job may still finish remotely
    #[error(
        "Job {id} still '{last_status}' after {} (timeout {})",
        fmt_duration(.elapsed),
        fmt_duration(.timeout)
    )]
    Timeout {
        id: JobId,
        elapsed: Duration,
        timeout: Duration,
        last_status: String,
    },

    /// A status query failed in a way waiting will not fix
    #[error("Status query for job {id} failed after {}", fmt_duration(.elapsed))]
    Status {
        id: JobId,
        elapsed: Duration,
        #[source]
        source: ClientError,
    },

    /// Cancelled while waiting
    #[error("Interrupted while waiting for job {id}")]
    Interrupted { id: JobId, elapsed: Duration },

    /// Cancelled before any job existed to resume
    #[error("Cancelled during {during}")]
    Cancelled { during: String },
}

fn fmt_duration(d: &Duration) -> String {
    format_elapsed(*d)
}

impl JobError {
    pub const EXIT_SUBMISSION: i32 = 3;
    pub const EXIT_JOB_FAILED: i32 = 4;
    pub const EXIT_TIMEOUT: i32 = 5;
    pub const EXIT_STATUS: i32 = 6;
    pub const EXIT_INTERRUPTED: i32 = 130;

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            JobError::Submission { .. } => Self::EXIT_SUBMISSION,
            JobError::JobFailed { .. } => Self::EXIT_JOB_FAILED,
            JobError::Timeout { .. } => Self::EXIT_TIMEOUT,
            JobError::Status { .. } => Self::EXIT_STATUS,
            JobError::Interrupted { .. } | JobError::Cancelled { .. } => Self::EXIT_INTERRUPTED,
        }
    }

    /// The job this error concerns, once one exists
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            JobError::Submission { .. } | JobError::Cancelled { .. } => None,
            JobError::JobFailed { id, .. }
            | JobError::Timeout { id, .. }
            | JobError::Status { id, .. }
            | JobError::Interrupted { id, .. } => Some(id),
        }
    }

    /// Whether polling the same id again later can still succeed
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            JobError::Timeout { .. } | JobError::Interrupted { .. }
        ) || matches!(self, JobError::Status { source, .. } if source.is_transient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let id = JobId::new("resp_1");
        let errors = [
            JobError::Submission {
                provider: "openai".into(),
                attempts: 1,
                source: ClientError::api_error(401, "bad key"),
            },
            JobError::JobFailed {
                id: id.clone(),
                detail: "boom".into(),
                elapsed: Duration::from_secs(40),
            },
            JobError::Timeout {
                id: id.clone(),
                elapsed: Duration::from_secs(600),
                timeout: Duration::from_secs(600),
                last_status: "in_progress".into(),
            },
            JobError::Status {
                id: id.clone(),
                elapsed: Duration::ZERO,
                source: ClientError::api_error(404, "missing"),
            },
            JobError::Interrupted {
                id,
                elapsed: Duration::ZERO,
            },
        ];

        let mut codes: Vec<i32> = errors.iter().map(JobError::exit_code).collect();
        assert!(codes.iter().all(|c| *c != 0 && *c != 1));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_source_is_not_repeated_in_message() {
        let err = JobError::Submission {
            provider: "openai".into(),
            attempts: 3,
            source: ClientError::api_error(401, "bad key"),
        };
        assert_eq!(err.to_string(), "Submission to openai failed after 3 attempt(s)");
        assert!(std::error::Error::source(&err).is_some());

        let err = JobError::Status {
            id: JobId::new("resp_1"),
            elapsed: Duration::from_secs(65),
            source: ClientError::api_error(404, "missing"),
        };
        assert!(!err.to_string().contains("missing"));

        // anyhow's alternate format appends each cause exactly once
        let rendered = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(rendered.matches("missing").count(), 1);
    }

    #[test]
    fn test_cancelled_is_interrupt_without_job() {
        let err = JobError::Cancelled {
            during: "submission to deepseek".into(),
        };
        assert_eq!(err.exit_code(), JobError::EXIT_INTERRUPTED);
        assert_eq!(err.to_string(), "Cancelled during submission to deepseek");
        assert!(err.job_id().is_none());
        assert!(!err.is_resumable());
    }

    #[test]
    fn test_timeout_message_and_resume() {
        let err = JobError::Timeout {
            id: JobId::new("resp_1"),
            elapsed: Duration::from_secs(1805),
            timeout: Duration::from_secs(1800),
            last_status: "in_progress".into(),
        };
        assert_eq!(
            err.to_string(),
            "Job resp_1 still 'in_progress' after 30m05s (timeout 30m00s)"
        );
        assert!(err.is_resumable());
        assert_eq!(err.job_id().map(JobId::as_str), Some("resp_1"));
    }
}
