//! Adaptive poll schedule
//!
//! The wait before the next status query is a step function of the time
//! elapsed since the first query. Short jobs are caught quickly, long jobs are
//! not hammered. There is no jitter: every job follows the same steps.

use std::time::Duration;

/// One step of the schedule: from `from` onwards wait `interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleStep {
    pub from: Duration,
    pub interval: Duration,
}

/// Step function mapping elapsed time to the next poll interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    steps: Vec<ScheduleStep>,
}

impl PollSchedule {
    /// The default schedule: 10s, then 30s, then 1min, then 5min
    ///
    /// | elapsed      | interval |
    /// |--------------|----------|
    /// | 0 – 10s      | 10s      |
    /// | 10s – 30s    | 30s      |
    /// | 30s – 5min   | 1min     |
    /// | 5min onwards | 5min     |
    pub fn adaptive() -> Self {
        Self {
            steps: vec![
                step(0, 10),
                step(10, 30),
                step(30, 60),
                step(300, 300),
            ],
        }
    }

    /// A schedule that always waits the same interval
    pub fn fixed(interval: Duration) -> Self {
        Self {
            steps: vec![ScheduleStep {
                from: Duration::ZERO,
                interval,
            }],
        }
    }

    /// Interval to wait after a query made `elapsed` after the first one
    ///
    /// Lower bounds are inclusive: at exactly 10s the 30s step applies.
    pub fn interval_for(&self, elapsed: Duration) -> Duration {
        self.steps
            .iter()
            .rev()
            .find(|s| elapsed >= s.from)
            .or_else(|| self.steps.first())
            .map(|s| s.interval)
            .unwrap_or(Duration::from_secs(10))
    }

    pub fn steps(&self) -> &[ScheduleStep] {
        &self.steps
    }

    /// Human readable summary, e.g. `10s → 30s → 1m → 5m`
    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|s| format_interval(s.interval))
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::adaptive()
    }
}

fn step(from_secs: u64, interval_secs: u64) -> ScheduleStep {
    ScheduleStep {
        from: Duration::from_secs(from_secs),
        interval: Duration::from_secs(interval_secs),
    }
}

fn format_interval(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Formats a duration as `{minutes}m{seconds:02}s`
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}m{:02}s", secs / 60, secs % 60)
}
