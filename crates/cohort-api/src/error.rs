//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every non-success path produces the same envelope: an HTTP status line plus
//! a JSON body of shape `{"error": <message>}`. Producing an error terminates
//! the request — handlers return it straight up and nothing runs afterwards.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error produced while handling a resource request.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Request payload absent, undecodable, or missing its top-level object.
  #[error("{0}")]
  MalformedInput(String),

  #[error("Candidate's field missing")]
  MissingField,

  #[error("Value not permitted")]
  DisallowedValue,

  #[error("Invalid date format")]
  InvalidFormat,

  /// The operation exists but is not permitted through this resource.
  #[error("{0}")]
  DisallowedOperation(String),

  #[error("Method not allowed")]
  MethodNotAllowed,

  /// Aggregate or listing query failed. Logged for operators; the client only
  /// ever sees a generic message.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::MalformedInput(_)
      | ApiError::MissingField
      | ApiError::DisallowedValue
      | ApiError::InvalidFormat => (StatusCode::BAD_REQUEST, self.to_string()),
      ApiError::DisallowedOperation(_) => (StatusCode::FORBIDDEN, self.to_string()),
      ApiError::MethodNotAllowed => {
        (StatusCode::METHOD_NOT_ALLOWED, self.to_string())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store query failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_string(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
