//! Candidate — the clinical-study participant entity.
//!
//! A candidate row is the unit returned by the listing query: the candidate's
//! own fields joined with the alias of the site it is registered at. Only rows
//! flagged active ever leave the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An active candidate joined with its registration site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
  pub cand_id:    i64,
  /// Raw project identifier. Resolved to a display name at the API boundary;
  /// the raw value itself is never serialised outward.
  pub project_id: Option<i64>,
  /// Study-wide identifier code assigned at registration.
  pub pscid:      String,
  /// Alias of the registration site.
  pub site:       String,
  pub dob:        NaiveDate,
  pub gender:     String,
  pub language:   Option<String>,
}
