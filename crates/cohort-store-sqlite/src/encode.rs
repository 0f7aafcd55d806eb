//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Modification timestamps are stored as RFC 3339 strings (which sort
//! lexicographically in chronological order, so SQL `MAX` works on them),
//! dates of birth as `YYYY-MM-DD`, and the active flag as `'Y'`/`'N'`.

use chrono::{DateTime, NaiveDate, Utc};
use cohort_core::Candidate;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Active flag ─────────────────────────────────────────────────────────────

pub fn encode_active(active: bool) -> &'static str {
  if active { "Y" } else { "N" }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `candidates` row joined with `sites`.
pub struct RawCandidate {
  pub cand_id:    i64,
  pub project_id: Option<i64>,
  pub pscid:      String,
  pub site:       String,
  pub dob:        String,
  pub gender:     String,
  pub language:   Option<String>,
}

impl RawCandidate {
  pub fn into_candidate(self) -> Result<Candidate> {
    Ok(Candidate {
      cand_id:    self.cand_id,
      project_id: self.project_id,
      pscid:      self.pscid,
      site:       self.site,
      dob:        decode_date(&self.dob)?,
      gender:     self.gender,
      language:   self.language,
    })
  }
}
