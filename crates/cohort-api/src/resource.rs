//! The resource contract — method gating, the conditional-GET tag protocol,
//! and per-method dispatch.
//!
//! Every resource type implements [`Resource`]; [`dispatch`] drives any
//! request through the same state machine regardless of the concrete type:
//! method gate → tag computed → tag compared → handler → response. The
//! terminal state is always a written response, and no handler runs twice.

use std::future::Future;

use axum::{
  Json,
  body::Body,
  http::{Method, StatusCode, header},
  response::{IntoResponse, Response},
};
use cohort_core::CandidateStore;
use serde_json::Value;

use crate::error::ApiError;

// ─── Method enumeration ──────────────────────────────────────────────────────

/// The closed set of verbs a resource can support.
///
/// Dispatch matches on this exhaustively; a verb outside the set (PUT,
/// DELETE, …) has no resource semantics at all and is rejected by the front
/// door before a resource is even selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceMethod {
  Get,
  Post,
}

impl ResourceMethod {
  pub fn from_http(method: &Method) -> Option<Self> {
    match method.as_str() {
      "GET" => Some(Self::Get),
      "POST" => Some(Self::Post),
      _ => None,
    }
  }
}

// ─── Request ─────────────────────────────────────────────────────────────────

/// A decoded inbound request.
///
/// Constructed once by the front door, immutable afterwards, passed by
/// reference into [`dispatch`]. Resource logic never reads ambient request
/// state.
#[derive(Debug)]
pub struct ResourceRequest {
  pub method:        ResourceMethod,
  /// Decoded JSON body, when one was supplied and parseable.
  pub payload:       Option<Value>,
  /// Client cache-validation token, taken from the `If-None-Match` header.
  pub if_none_match: Option<String>,
}

// ─── Contract ────────────────────────────────────────────────────────────────

/// Capability contract implemented per entity type.
///
/// `allowed_methods` gates dispatch before any business logic runs;
/// `compute_tag` backs the conditional-GET protocol; one handler exists per
/// supported method, returning the JSON-serialisable result body or a
/// terminal [`ApiError`].
pub trait Resource<S: CandidateStore> {
  fn allowed_methods(&self) -> &'static [ResourceMethod];

  /// Current entity tag for the collection this resource exposes.
  fn compute_tag<'a>(
    &'a self,
    store: &'a S,
  ) -> impl Future<Output = Result<String, ApiError>> + Send + 'a;

  fn handle_get<'a>(
    &'a self,
    store: &'a S,
  ) -> impl Future<Output = Result<Value, ApiError>> + Send + 'a;

  fn handle_post<'a>(
    &'a self,
    store: &'a S,
    payload: Option<&'a Value>,
  ) -> impl Future<Output = Result<Value, ApiError>> + Send + 'a;
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Drive `request` through the resource state machine and produce the final
/// response.
///
/// The tag is computed before the method handler runs. A request whose token
/// matches the tag short-circuits to 304 with an empty body — the handler
/// never executes. Otherwise the handler runs once and the tag travels out on
/// the `ETag` header of the success response.
pub async fn dispatch<S, R>(
  resource: &R,
  store: &S,
  request: &ResourceRequest,
) -> Result<Response, ApiError>
where
  S: CandidateStore,
  R: Resource<S>,
{
  if !resource.allowed_methods().contains(&request.method) {
    return Err(ApiError::MethodNotAllowed);
  }

  let tag = resource.compute_tag(store).await?;

  if let Some(token) = request.if_none_match.as_deref()
    && strip_tag_quotes(token) == strip_tag_quotes(&tag)
  {
    return Ok(
      Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::ETAG, &tag)
        .body(Body::empty())
        .unwrap(),
    );
  }

  let body = match request.method {
    ResourceMethod::Get => resource.handle_get(store).await?,
    ResourceMethod::Post => {
      resource.handle_post(store, request.payload.as_ref()).await?
    }
  };

  Ok(([(header::ETAG, tag)], Json(body)).into_response())
}

/// Strip surrounding double-quotes from a tag value.
///
/// `If-None-Match` headers may carry tags with or without the surrounding `"`
/// required by RFC 7232. Normalise before comparing so both forms are
/// accepted.
fn strip_tag_quotes(s: &str) -> &str { s.trim_matches('"') }
