//! Scheduler layer for the runner
//!
//! This layer waits on remote jobs. It decides when to query a provider,
//! tolerates transient failures, and enforces the overall budget.

pub mod poller;

pub use poller::AdaptivePoller;
