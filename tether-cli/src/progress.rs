//! Console progress
//!
//! Renders poll attempts on stderr so stdout stays reserved for results.

use colored::*;
use tether_core::domain::job::JobState;
use tether_core::domain::poll::PollAttempt;
use tether_core::domain::schedule::format_elapsed;
use tether_runner::ProgressReporter;

/// Attempts between progress lines when not verbose
const QUIET_EVERY: u32 = 5;

/// Prints poll attempts to stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Whether an attempt deserves a line
    ///
    /// Verbose mode shows every attempt. Otherwise the first, every fifth,
    /// and any terminal one are shown.
    pub fn should_report(&self, attempt: &PollAttempt) -> bool {
        self.verbose
            || attempt.index == 1
            || attempt.index % QUIET_EVERY == 0
            || attempt.state.is_terminal()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn on_attempt(&self, attempt: &PollAttempt) {
        if self.should_report(attempt) {
            eprintln!("{}", format_attempt(attempt));
        }
    }
}

/// One progress line
pub fn format_attempt(attempt: &PollAttempt) -> String {
    let status = match attempt.state {
        _ if attempt.transient => attempt.observed.yellow(),
        JobState::Pending => attempt.observed.cyan(),
        JobState::Succeeded => attempt.observed.green(),
        JobState::Failed => attempt.observed.red(),
    };

    let mut line = format!(
        "{} {} {} · elapsed {} · remaining {}",
        "▸".cyan(),
        format!("[{} #{}]", attempt.job_id.short(), attempt.index).dimmed(),
        status,
        format_elapsed(attempt.elapsed),
        format_elapsed(attempt.remaining)
    );

    if let Some(next) = attempt.next_interval {
        line.push_str(&format!(" · next check in {}", format_elapsed(next)));
    }

    line
}
