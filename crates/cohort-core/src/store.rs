//! The `CandidateStore` trait and the cache-criteria type.
//!
//! The trait is implemented by storage backends (e.g. `cohort-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend. The
//! trait is read-only — the HTTP layer performs no writes.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::{collections::HashMap, future::Future};

use chrono::{DateTime, Utc};

use crate::candidate::Candidate;

// ─── Cache criteria ──────────────────────────────────────────────────────────

/// The aggregate state a collection entity tag is derived from.
///
/// Recomputed per request, never persisted. Two requests observing the same
/// criteria must produce the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagCriteria {
  /// Most recent modification timestamp across active candidates. `None` when
  /// the collection is empty.
  pub latest_change: Option<DateTime<Utc>>,
  /// Count of distinct active candidates.
  pub active_count:  u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the candidate query service.
///
/// A request performs at most two reads: the tag aggregate, then the entity
/// rows. They are independent reads — the tag may go stale between them, and
/// that race is accepted (the client briefly sees data newer than the tag it
/// cached).
pub trait CandidateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The single aggregate row backing tag computation: max modification time
  /// and count of distinct active candidates.
  fn tag_criteria(
    &self,
  ) -> impl Future<Output = Result<TagCriteria, Self::Error>> + Send + '_;

  /// All active candidates joined with their site, in stable order.
  fn list_active(
    &self,
  ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + '_;

  /// Map from raw project identifier to human-readable project name.
  fn project_names(
    &self,
  ) -> impl Future<Output = Result<HashMap<i64, String>, Self::Error>> + Send + '_;
}
