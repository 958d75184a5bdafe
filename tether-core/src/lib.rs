//! Tether Core
//!
//! Core types and abstractions shared by the Tether tools.
//!
//! This crate contains:
//! - Domain types: jobs, provider status normalization, the adaptive poll schedule
//! - DTOs: provider wire payloads and the extraction of finished results

pub mod domain;
pub mod dto;
