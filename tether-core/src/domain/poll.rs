//! Poll attempt records
//!
//! Ephemeral; used only for operator-facing progress reporting.

use std::time::Duration;

use crate::domain::job::{JobId, JobState};

/// One status query made by the poller
#[derive(Debug, Clone, PartialEq)]
pub struct PollAttempt {
    pub job_id: JobId,
    /// 1-based attempt number
    pub index: u32,
    /// Time since the first attempt
    pub elapsed: Duration,
    /// Budget left before the poller gives up
    pub remaining: Duration,
    /// Wait chosen before the next attempt; `None` when no further attempt follows
    pub next_interval: Option<Duration>,
    pub state: JobState,
    /// Status as the provider spelled it, or the transient error message
    pub observed: String,
    /// The query failed with a transient error
    pub transient: bool,
}
