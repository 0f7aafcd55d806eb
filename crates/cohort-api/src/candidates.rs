//! The candidates resource — listing for the candidate entity, plus the
//! controlled rejection of creation.

use std::collections::HashMap;

use chrono::NaiveDate;
use cohort_core::{Candidate, CandidateStore};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
  error::ApiError,
  resource::{Resource, ResourceMethod},
  tag::candidates_tag,
};

/// Display name used when a candidate's project identifier has no known
/// mapping.
pub const PROJECT_FALLBACK: &str = "loris";

// ─── Outbound projection ─────────────────────────────────────────────────────

/// One row of the outbound listing.
///
/// The raw project identifier never leaves the API — it is replaced by the
/// resolved `Project` name. The study identifier code is likewise not part of
/// this projection.
#[derive(Debug, Serialize)]
pub struct CandidateEntry {
  #[serde(rename = "CandID")]
  pub cand_id:  i64,
  #[serde(rename = "Site")]
  pub site:     String,
  #[serde(rename = "DoB")]
  pub dob:      NaiveDate,
  #[serde(rename = "Gender")]
  pub gender:   String,
  #[serde(rename = "Language")]
  pub language: Option<String>,
  #[serde(rename = "Project")]
  pub project:  String,
}

impl CandidateEntry {
  fn from_row(candidate: Candidate, projects: &HashMap<i64, String>) -> Self {
    let project = candidate
      .project_id
      .and_then(|id| projects.get(&id).cloned())
      .unwrap_or_else(|| PROJECT_FALLBACK.to_string());

    Self {
      cand_id: candidate.cand_id,
      site: candidate.site,
      dob: candidate.dob,
      gender: candidate.gender,
      language: candidate.language,
      project,
    }
  }
}

// ─── Resource ────────────────────────────────────────────────────────────────

/// The `/candidates` collection resource.
///
/// Reads succeed; creation is deliberately refused. POST is in the allow-list
/// so the refusal is a controlled response rather than a method-gate
/// rejection.
pub struct CandidateResource;

impl<S: CandidateStore> Resource<S> for CandidateResource {
  fn allowed_methods(&self) -> &'static [ResourceMethod] {
    &[ResourceMethod::Get, ResourceMethod::Post]
  }

  async fn compute_tag(&self, store: &S) -> Result<String, ApiError> {
    let criteria = store
      .tag_criteria()
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    Ok(candidates_tag(&criteria))
  }

  async fn handle_get(&self, store: &S) -> Result<Value, ApiError> {
    let rows = store
      .list_active()
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    let projects = store
      .project_names()
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;

    let entries: Vec<CandidateEntry> = rows
      .into_iter()
      .map(|row| CandidateEntry::from_row(row, &projects))
      .collect();

    Ok(json!({ "Candidates": entries }))
  }

  async fn handle_post(
    &self,
    _store: &S,
    payload: Option<&Value>,
  ) -> Result<Value, ApiError> {
    let data = payload
      .ok_or_else(|| ApiError::MalformedInput("Can't parse data".to_string()))?;

    if data.get("Candidate").is_none() {
      return Err(ApiError::MalformedInput(
        "There is no Candidate object in the POST data".to_string(),
      ));
    }

    // Shape checks first, then the unconditional refusal. Creating candidates
    // through this resource is not permitted.
    Err(ApiError::DisallowedOperation(
      "Create candidate: Operation not permitted".to_string(),
    ))
  }
}
