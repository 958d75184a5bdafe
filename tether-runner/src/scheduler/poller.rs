//! Adaptive job poller
//!
//! Waits on a remote job by querying its status on the adaptive schedule
//! until it reaches a terminal state or the budget runs out. The poller holds
//! no state between invocations: given the same id, a fresh process observes
//! the same remote job.

use std::sync::Arc;
use std::time::Duration;
use tether_client::StatusSource;
use tether_core::domain::job::{JobId, JobSnapshot, JobState};
use tether_core::domain::poll::PollAttempt;
use tether_core::domain::schedule::{PollSchedule, format_elapsed};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::error::JobError;
use crate::service::{ProgressReporter, SilentProgress};

/// Poller that waits for one job to finish
pub struct AdaptivePoller<S: StatusSource + ?Sized> {
    source: Arc<S>,
    schedule: PollSchedule,
    timeout: Duration,
    progress: Arc<dyn ProgressReporter>,
    cancel: CancellationToken,
}

impl<S: StatusSource + ?Sized> AdaptivePoller<S> {
    /// Creates a new poller reading from `source`
    pub fn new(source: Arc<S>, config: &RunnerConfig) -> Self {
        Self {
            source,
            schedule: config.schedule.clone(),
            timeout: config.timeout,
            progress: Arc::new(SilentProgress),
            cancel: CancellationToken::new(),
        }
    }

    /// Reports every attempt to `progress`
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Abandons the wait as soon as `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Performs exactly one status query, whatever the status
    ///
    /// Used for manual inspection without committing to the wait budget.
    pub async fn check(&self, id: &JobId) -> Result<JobSnapshot, JobError> {
        info!("Checking status of job {}", id);

        let snapshot = self.query(id, Duration::ZERO).await?.map_err(|source| {
            JobError::Status {
                id: id.clone(),
                elapsed: Duration::ZERO,
                source,
            }
        })?;

        let state = snapshot.state();
        self.progress.on_attempt(&PollAttempt {
            job_id: id.clone(),
            index: 1,
            elapsed: Duration::ZERO,
            remaining: self.timeout,
            next_interval: None,
            state,
            observed: snapshot.status.raw().to_string(),
            transient: false,
        });

        Ok(snapshot)
    }

    /// Polls until the job succeeds, fails, or the budget runs out
    ///
    /// # Returns
    /// The snapshot carrying the finished payload
    ///
    /// # Errors
    /// - [`JobError::JobFailed`] when the provider reports a terminal failure
    /// - [`JobError::Timeout`] once at least the configured budget has elapsed
    /// - [`JobError::Status`] when a query fails with a non-transient error
    /// - [`JobError::Interrupted`] when the cancellation token fires
    pub async fn wait(&self, id: &JobId) -> Result<JobSnapshot, JobError> {
        info!(
            "Polling job {} via {} (timeout: {}, intervals: {})",
            id,
            self.source.provider_name(),
            format_elapsed(self.timeout),
            self.schedule.describe()
        );

        let start = Instant::now();
        let mut index: u32 = 0;
        let mut last_status = String::from("unknown");

        loop {
            index += 1;

            let outcome = self.query(id, start.elapsed()).await?;
            let elapsed = start.elapsed();
            let remaining = self.timeout.saturating_sub(elapsed);

            let (state, observed, transient) = match outcome {
                Ok(snapshot) => {
                    let state = snapshot.state();
                    last_status = snapshot.status.raw().to_string();

                    match state {
                        JobState::Succeeded => {
                            self.report(id, index, elapsed, remaining, None, state, &last_status, false);
                            info!(
                                "Job {} completed after {} ({} poll(s))",
                                id,
                                format_elapsed(elapsed),
                                index
                            );
                            return Ok(snapshot);
                        }
                        JobState::Failed => {
                            self.report(id, index, elapsed, remaining, None, state, &last_status, false);
                            let detail = snapshot
                                .error
                                .clone()
                                .unwrap_or_else(|| format!("provider reported '{}'", last_status));
                            return Err(JobError::JobFailed {
                                id: id.clone(),
                                detail,
                                elapsed,
                            });
                        }
                        JobState::Pending => (state, last_status.clone(), false),
                    }
                }
                Err(err) if err.is_transient() => {
                    warn!(
                        "Transient error polling job {} (attempt {}): {}",
                        id, index, err
                    );
                    (JobState::Pending, err.to_string(), true)
                }
                Err(source) => {
                    return Err(JobError::Status {
                        id: id.clone(),
                        elapsed,
                        source,
                    });
                }
            };

            if elapsed >= self.timeout {
                self.report(id, index, elapsed, remaining, None, state, &observed, transient);
                warn!(
                    "Timed out waiting for job {} after {} ({} poll(s))",
                    id,
                    format_elapsed(elapsed),
                    index
                );
                return Err(JobError::Timeout {
                    id: id.clone(),
                    elapsed,
                    timeout: self.timeout,
                    last_status,
                });
            }

            // Never sleep past the deadline; the last query lands on it
            let interval = self.schedule.interval_for(elapsed).min(remaining);
            self.report(id, index, elapsed, remaining, Some(interval), state, &observed, transient);

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(self.interrupted(id, start.elapsed()));
                }
                _ = time::sleep(interval) => {}
            }
        }
    }

    /// One status query, abandoned if cancellation fires meanwhile
    ///
    /// The outer result is the interruption; the inner one is the provider
    /// answer.
    async fn query(
        &self,
        id: &JobId,
        elapsed: Duration,
    ) -> Result<tether_client::Result<JobSnapshot>, JobError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(self.interrupted(id, elapsed)),
            outcome = self.source.get_status(id) => Ok(outcome),
        }
    }

    fn interrupted(&self, id: &JobId, elapsed: Duration) -> JobError {
        warn!("Stopped waiting for job {} after {}", id, format_elapsed(elapsed));
        JobError::Interrupted {
            id: id.clone(),
            elapsed,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        id: &JobId,
        index: u32,
        elapsed: Duration,
        remaining: Duration,
        next_interval: Option<Duration>,
        state: JobState,
        observed: &str,
        transient: bool,
    ) {
        debug!(
            "Poll {} for job {}: {} (elapsed {}, next in {:?})",
            index,
            id,
            observed,
            format_elapsed(elapsed),
            next_interval
        );

        self.progress.on_attempt(&PollAttempt {
            job_id: id.clone(),
            index,
            elapsed,
            remaining,
            next_interval,
            state,
            observed: observed.to_string(),
            transient,
        });
    }
}
