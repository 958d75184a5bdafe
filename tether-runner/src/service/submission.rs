//! Job submission service
//!
//! Sends a validated request to a provider exactly once from the caller's
//! point of view. Rejections are surfaced immediately; only failures where the
//! provider never answered are retried, back to back, a bounded number of
//! times. A cancellation token abandons the submission, including any
//! request already in flight.

use std::sync::Arc;
use tether_client::JobProvider;
use tether_core::domain::job::JobSnapshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::RunnerConfig;
use crate::error::JobError;

/// Submits jobs to one provider
pub struct Submitter<P: JobProvider + ?Sized> {
    provider: Arc<P>,
    attempts: u32,
    cancel: CancellationToken,
}

impl<P: JobProvider + ?Sized> Submitter<P> {
    pub fn new(provider: Arc<P>, config: &RunnerConfig) -> Self {
        Self {
            provider,
            attempts: config.submit_attempts.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Gives up on the submission as soon as `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Submits `request` and returns the identifier with the initial status
    ///
    /// # Errors
    /// [`JobError::Submission`] when the provider rejects the request, or when
    /// every attempt failed before reaching it. [`JobError::Cancelled`] when
    /// the cancellation token fires first.
    pub async fn submit(&self, request: &P::Request) -> Result<JobSnapshot, JobError> {
        let provider = self.provider.provider_name().to_string();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Submission to {} cancelled", provider);
                    return Err(JobError::Cancelled {
                        during: format!("submission to {}", provider),
                    });
                }
                outcome = self.provider.submit(request) => outcome,
            };

            match outcome {
                Ok(snapshot) => {
                    if attempt > 1 {
                        info!(
                            "Submitted to {} after {} attempt(s)",
                            provider, attempt
                        );
                    }
                    info!(
                        "Job {} submitted to {} (status: {})",
                        snapshot.id, provider, snapshot.status
                    );
                    return Ok(snapshot);
                }
                Err(e) if e.is_network() && attempt < self.attempts => {
                    warn!(
                        "Could not reach {} (attempt {}/{}): {}",
                        provider, attempt, self.attempts, e
                    );
                }
                Err(e) => {
                    error!("Submission to {} failed: {}", provider, e);
                    return Err(JobError::Submission {
                        provider,
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}
