//! Progress reporting service
//!
//! The poller hands every [`PollAttempt`] to a reporter so the operator can
//! follow a long wait. Attempts are ephemeral: nothing here is persisted.

use std::sync::{Arc, Mutex};
use tether_core::domain::poll::PollAttempt;

/// Receives one record per status query
pub trait ProgressReporter: Send + Sync {
    /// Called after each status query, before waiting for the next one
    ///
    /// # Arguments
    /// * `attempt` - The attempt that just completed
    fn on_attempt(&self, attempt: &PollAttempt);
}

/// Reporter that discards every attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn on_attempt(&self, _attempt: &PollAttempt) {}
}

/// In-memory reporter keeping every attempt
///
/// Uses Arc<Mutex<Vec<PollAttempt>>> so clones share the same record.
#[derive(Clone, Default)]
pub struct RecordedProgress {
    attempts: Arc<Mutex<Vec<PollAttempt>>>,
}

impl RecordedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every attempt seen so far
    pub fn attempts(&self) -> Vec<PollAttempt> {
        match self.attempts.lock() {
            Ok(attempts) => attempts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressReporter for RecordedProgress {
    fn on_attempt(&self, attempt: &PollAttempt) {
        match self.attempts.lock() {
            Ok(mut attempts) => attempts.push(attempt.clone()),
            Err(poisoned) => poisoned.into_inner().push(attempt.clone()),
        }
    }
}
