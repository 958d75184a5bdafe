//! Data Transfer Objects for provider communication
//!
//! Request bodies sent to providers and the lenient views used to read their
//! responses. Only the fields the tools rely on are modelled; the raw JSON is
//! always kept alongside so nothing the provider returned is lost.

pub mod presentation;
pub mod research;
