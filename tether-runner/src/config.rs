//! Runner configuration
//!
//! Timing parameters for submitting and waiting on a job. Values are passed
//! explicitly to the submitter and poller; nothing is read from the process
//! environment here.

use std::time::Duration;
use tether_core::domain::schedule::PollSchedule;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Step function choosing the wait between status queries
    pub schedule: PollSchedule,

    /// Overall budget for waiting on one job
    pub timeout: Duration,

    /// Total submission attempts when the network fails before an answer
    pub submit_attempts: u32,
}

impl RunnerConfig {
    /// Default budget for research jobs
    pub const RESEARCH_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    /// Default budget for presentation jobs
    pub const PRESENTATION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

    pub fn new(timeout: Duration) -> Self {
        Self {
            schedule: PollSchedule::adaptive(),
            timeout,
            submit_attempts: 3,
        }
    }

    /// Configuration for deep research jobs (30 minute budget)
    pub fn research() -> Self {
        Self::new(Self::RESEARCH_TIMEOUT)
    }

    /// Configuration for presentation jobs (10 minute budget)
    pub fn presentation() -> Self {
        Self::new(Self::PRESENTATION_TIMEOUT)
    }

    /// Overrides the overall budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_submit_attempts(mut self, attempts: u32) -> Self {
        self.submit_attempts = attempts;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.submit_attempts == 0 {
            anyhow::bail!("submit_attempts must be greater than 0");
        }

        if self.schedule.steps().is_empty() {
            anyhow::bail!("poll schedule must have at least one step");
        }

        if self.schedule.steps().iter().any(|s| s.interval.is_zero()) {
            anyhow::bail!("poll intervals must be greater than 0");
        }

        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::research()
    }
}
