//! HTTP layer for the cohort candidate service.
//!
//! Exposes an axum [`Router`] serving JSON resources backed by any
//! [`CandidateStore`]. The front door here only parses the raw request,
//! selects the resource, and writes the serialised response — everything with
//! design weight lives in [`resource`] and the concrete resource modules.

pub mod candidates;
pub mod error;
pub mod fields;
pub mod resource;
pub mod tag;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  body::Body,
  extract::{Request, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
  routing::any,
};
use bytes::Bytes;
use cohort_core::CandidateStore;
use serde::Deserialize;

use candidates::CandidateResource;
use resource::{ResourceMethod, ResourceRequest, dispatch};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CandidateStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the candidate API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CandidateStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/candidates", any(candidates_handler::<S>))
    .with_state(state)
}

// ─── Front door ──────────────────────────────────────────────────────────────

/// Parse the raw request, build the immutable [`ResourceRequest`], and hand it
/// to dispatch. This is the only place raw HTTP input is read.
async fn candidates_handler<S>(
  State(state): State<AppState<S>>,
  req: Request<Body>,
) -> Response
where
  S: CandidateStore + Clone + Send + Sync + 'static,
{
  let method = match ResourceMethod::from_http(req.method()) {
    Some(m) => m,
    None => return ApiError::MethodNotAllowed.into_response(),
  };

  let if_none_match = req
    .headers()
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .map(|s| s.to_string());

  let payload = match method {
    ResourceMethod::Get => None,
    ResourceMethod::Post => {
      let bytes = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return e,
      };
      decode_payload(&bytes)
    }
  };

  let request = ResourceRequest { method, payload, if_none_match };

  dispatch(&CandidateResource, state.store.as_ref(), &request)
    .await
    .into_response_or_err()
}

/// Decode a POST body as JSON. An empty or undecodable body yields `None`,
/// which the create path reports as unparseable data.
fn decode_payload(bytes: &Bytes) -> Option<serde_json::Value> {
  if bytes.is_empty() {
    return None;
  }
  serde_json::from_slice(bytes).ok()
}

async fn collect_body(req: Request<Body>) -> Result<Bytes, Response> {
  axum::body::to_bytes(req.into_body(), 8 * 1024 * 1024)
    .await
    .map_err(|_| {
      (StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
        .into_response()
    })
}

// ─── Helper trait ────────────────────────────────────────────────────────────

trait IntoResponseOrErr {
  fn into_response_or_err(self) -> Response;
}

impl IntoResponseOrErr for Result<Response, ApiError> {
  fn into_response_or_err(self) -> Response {
    match self {
      Ok(r) => r,
      Err(e) => e.into_response(),
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::http::{Request, StatusCode, header};
  use chrono::{NaiveDate, TimeZone, Utc};
  use cohort_store_sqlite::{NewCandidate, SqliteStore};
  use serde_json::Value;
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:       "127.0.0.1".to_string(),
        port:       8080,
        store_path: PathBuf::from(":memory:"),
      }),
    }
  }

  fn new_candidate(cand_id: i64, project_id: Option<i64>) -> NewCandidate {
    NewCandidate {
      cand_id,
      pscid: format!("MTL{cand_id:04}"),
      site_id: 1,
      project_id,
      dob: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
      gender: "Female".to_string(),
      language: Some("English".to_string()),
      active: true,
      test_date: Utc.timestamp_opt(1_000, 0).unwrap(),
    }
  }

  async fn seed(state: &AppState<SqliteStore>) {
    state
      .store
      .add_site(1, "Montreal Neurological Institute", "MTL")
      .await
      .unwrap();
    state.store.add_project(2, "Beta Study").await.unwrap();
    state.store.add_candidate(new_candidate(100001, Some(2))).await.unwrap();
    state.store.add_candidate(new_candidate(100002, Some(99))).await.unwrap();
  }

  async fn oneshot_raw(
    state:   AppState<SqliteStore>,
    method:  &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri("/candidates");
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── GET ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_empty_store_returns_empty_listing() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "GET", vec![], "").await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ETAG));
    let json = body_json(resp).await;
    assert_eq!(json["Candidates"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn get_lists_candidates_with_projection_keys_only() {
    let state = make_state().await;
    seed(&state).await;

    let resp = oneshot_raw(state, "GET", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let entries = json["Candidates"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    for entry in entries {
      let mut keys: Vec<&str> =
        entry.as_object().unwrap().keys().map(String::as_str).collect();
      keys.sort_unstable();
      assert_eq!(
        keys,
        vec!["CandID", "DoB", "Gender", "Language", "Project", "Site"]
      );
    }

    assert_eq!(entries[0]["Project"], "Beta Study");
    // Project id 99 has no mapping and resolves to the fallback label.
    assert_eq!(entries[1]["Project"], "loris");
    assert_eq!(entries[1]["Site"], "MTL");
  }

  // ── Conditional GET ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn etag_round_trip_returns_304_with_empty_body() {
    let state = make_state().await;
    seed(&state).await;

    let first = oneshot_raw(state.clone(), "GET", vec![], "").await;
    let etag = first
      .headers()
      .get(header::ETAG)
      .unwrap()
      .to_str()
      .unwrap()
      .to_string();

    let second = oneshot_raw(
      state,
      "GET",
      vec![(header::IF_NONE_MATCH, etag.as_str())],
      "",
    )
    .await;
    assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    let bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
      .await
      .unwrap();
    assert!(bytes.is_empty());
  }

  #[tokio::test]
  async fn unquoted_token_also_returns_304() {
    // Some clients send the token without the surrounding double-quotes.
    let state = make_state().await;
    seed(&state).await;

    let first = oneshot_raw(state.clone(), "GET", vec![], "").await;
    let etag_quoted =
      first.headers().get(header::ETAG).unwrap().to_str().unwrap().to_string();
    let etag_bare = etag_quoted.trim_matches('"').to_string();

    let second = oneshot_raw(
      state,
      "GET",
      vec![(header::IF_NONE_MATCH, etag_bare.as_str())],
      "",
    )
    .await;
    assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
  }

  #[tokio::test]
  async fn stale_token_returns_full_listing() {
    let state = make_state().await;
    seed(&state).await;

    let first = oneshot_raw(state.clone(), "GET", vec![], "").await;
    let etag =
      first.headers().get(header::ETAG).unwrap().to_str().unwrap().to_string();

    // A new registration moves both the count and the latest timestamp.
    state
      .store
      .add_candidate(NewCandidate {
        test_date: Utc.timestamp_opt(2_000, 0).unwrap(),
        ..new_candidate(100003, None)
      })
      .await
      .unwrap();

    let second = oneshot_raw(
      state,
      "GET",
      vec![(header::IF_NONE_MATCH, etag.as_str())],
      "",
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);
    let json = body_json(second).await;
    assert_eq!(json["Candidates"].as_array().unwrap().len(), 3);
  }

  // ── POST ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_without_body_is_bad_request() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "POST", vec![], "").await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Can't parse data");
  }

  #[tokio::test]
  async fn post_with_undecodable_body_is_bad_request() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "POST", vec![], "{not json").await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Can't parse data");
  }

  #[tokio::test]
  async fn post_without_candidate_object_is_bad_request() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "POST", vec![], r#"{"Visit": {}}"#).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "There is no Candidate object in the POST data");
  }

  #[tokio::test]
  async fn post_with_candidate_object_is_forbidden() {
    let state = make_state().await;
    let body = r#"{"Candidate": {"PSCID": "OTT0001", "Gender": "F"}}"#;
    let resp = oneshot_raw(state, "POST", vec![], body).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Create candidate: Operation not permitted");
  }

  // ── Unknown verbs ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn put_returns_405() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "PUT", vec![], "").await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Method not allowed");
  }

  #[tokio::test]
  async fn delete_returns_405() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "DELETE", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
  }
}
