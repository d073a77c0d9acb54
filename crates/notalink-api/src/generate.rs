//! Handler for `POST /ai/generate`.
//!
//! Body: [`GenerateRequest`]; only `variables` is required. Returns the
//! [`GenerateResponse`] envelope; 404 for an unknown `prompt_id`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use notalink_core::store::NoteStore;
use notalink_repro::{Engine, GenerateRequest, GenerateResponse, TemplateSource};

use crate::{ApiState, error::ApiError};

/// `POST /ai/generate`
pub async fn handler<S, E, T>(
  State(state): State<ApiState<S, E, T>>,
  body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError>
where
  S: NoteStore,
  E: Engine,
  T: TemplateSource,
{
  let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let response = state.generator.generate(request).await?;
  Ok(Json(response))
}
