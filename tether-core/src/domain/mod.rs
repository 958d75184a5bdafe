//! Core domain types
//!
//! This module contains the structures that describe a remote job as seen
//! from the client side. Providers own the authoritative job state; these
//! types only carry the last observation of it.

pub mod job;
pub mod poll;
pub mod schedule;
pub mod status;
