//! [`SqliteStore`] — the SQLite implementation of [`CandidateStore`].

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, NaiveDate, Utc};
use cohort_core::{Candidate, CandidateStore, TagCriteria};

use crate::{
  Error, Result,
  encode::{RawCandidate, decode_dt, encode_active, encode_date, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A candidate store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Seeding writes ──────────────────────────────────────────────────────────

/// Parameters for [`SqliteStore::add_candidate`].
///
/// Seeding-only: the HTTP layer never writes. Candidate creation over the API
/// is a deliberately rejected operation, so these helpers exist for test
/// fixtures and demo data loading.
pub struct NewCandidate {
  pub cand_id:    i64,
  pub pscid:      String,
  pub site_id:    i64,
  pub project_id: Option<i64>,
  pub dob:        NaiveDate,
  pub gender:     String,
  pub language:   Option<String>,
  pub active:     bool,
  pub test_date:  DateTime<Utc>,
}

impl SqliteStore {
  pub async fn add_site(&self, site_id: i64, name: &str, alias: &str) -> Result<()> {
    let name = name.to_string();
    let alias = alias.to_string();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sites (site_id, name, alias) VALUES (?1, ?2, ?3)",
          rusqlite::params![site_id, name, alias],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_project(&self, project_id: i64, name: &str) -> Result<()> {
    let name = name.to_string();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO projects (project_id, name) VALUES (?1, ?2)",
          rusqlite::params![project_id, name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_candidate(&self, candidate: NewCandidate) -> Result<()> {
    let dob = encode_date(candidate.dob);
    let active = encode_active(candidate.active);
    let test_date = encode_dt(candidate.test_date);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO candidates
             (cand_id, pscid, site_id, project_id, dob, gender, language, active, test_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            candidate.cand_id,
            candidate.pscid,
            candidate.site_id,
            candidate.project_id,
            dob,
            candidate.gender,
            candidate.language,
            active,
            test_date,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CandidateStore impl ─────────────────────────────────────────────────────

impl CandidateStore for SqliteStore {
  type Error = Error;

  async fn tag_criteria(&self) -> Result<TagCriteria> {
    let (latest, count): (Option<String>, i64) = self
      .conn
      .call(|conn| {
        let row = conn.query_row(
          "SELECT MAX(test_date), COUNT(DISTINCT cand_id)
             FROM candidates WHERE active = 'Y'",
          [],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(row)
      })
      .await?;

    Ok(TagCriteria {
      latest_change: latest.as_deref().map(decode_dt).transpose()?,
      active_count:  count as u64,
    })
  }

  async fn list_active(&self) -> Result<Vec<Candidate>> {
    let raws: Vec<RawCandidate> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT c.cand_id, c.project_id, c.pscid, s.alias,
                  c.dob, c.gender, c.language
             FROM candidates c JOIN sites s ON s.site_id = c.site_id
            WHERE c.active = 'Y'
            ORDER BY c.cand_id",
        )?;
        let rows = stmt
          .query_map([], |r| {
            Ok(RawCandidate {
              cand_id:    r.get(0)?,
              project_id: r.get(1)?,
              pscid:      r.get(2)?,
              site:       r.get(3)?,
              dob:        r.get(4)?,
              gender:     r.get(5)?,
              language:   r.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCandidate::into_candidate).collect()
  }

  async fn project_names(&self) -> Result<HashMap<i64, String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT project_id, name FROM projects")?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<HashMap<i64, String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }
}
