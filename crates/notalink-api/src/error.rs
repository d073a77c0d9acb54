//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("generation error: {0}")]
  Generation(#[source] notalink_repro::Error),
}

impl From<notalink_core::Error> for ApiError {
  fn from(e: notalink_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl From<notalink_repro::Error> for ApiError {
  fn from(e: notalink_repro::Error) -> Self {
    match e {
      notalink_repro::Error::TemplateNotFound(id) => {
        ApiError::NotFound(format!("template {id} not found"))
      }
      notalink_repro::Error::InvalidRequest(m) => ApiError::BadRequest(m),
      other => ApiError::Generation(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Generation(e) => {
        tracing::error!(error = %e, "generation failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
