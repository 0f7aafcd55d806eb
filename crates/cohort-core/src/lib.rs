//! Core types and trait definitions for the cohort candidate service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod candidate;
pub mod store;

pub use candidate::Candidate;
pub use store::{CandidateStore, TagCriteria};
