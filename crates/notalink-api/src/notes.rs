//! Handlers for `/notes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notes` | Optional `?limit=N` (default 20); most recent first |
//! | `POST` | `/notes` | Body: [`NoteInput`]; returns 201 + stored note |
//! | `GET`  | `/notes/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use notalink_core::{
  NoteId,
  note::{Note, NoteInput},
  store::{DEFAULT_LIST_LIMIT, NoteStore},
};
use notalink_repro::{Engine, TemplateSource};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /notes[?limit=N]`
pub async fn list<S, E, T>(
  State(state): State<ApiState<S, E, T>>,
  query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError>
where
  S: NoteStore,
  E: Engine,
  T: TemplateSource,
{
  let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let notes = state
    .store
    .list_recent(params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(notes))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /notes`, body: `{"body":"...","category":"fleeting", ...}`
pub async fn create<S, E, T>(
  State(state): State<ApiState<S, E, T>>,
  body: Result<Json<NoteInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore,
  E: Engine,
  T: TemplateSource,
{
  let Json(input) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let new = input.validate()?;

  let note = state
    .store
    .create(new)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(note)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /notes/{id}`
pub async fn get_one<S, E, T>(
  State(state): State<ApiState<S, E, T>>,
  Path(id): Path<String>,
) -> Result<Json<Note>, ApiError>
where
  S: NoteStore,
  E: Engine,
  T: TemplateSource,
{
  let not_found = || ApiError::NotFound(format!("note {id} not found"));
  // An id that could never have been stored is simply absent.
  let note_id = NoteId::parse(id.as_str()).map_err(|_| not_found())?;

  let note = state
    .store
    .get(&note_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(not_found)?;
  Ok(Json(note))
}
