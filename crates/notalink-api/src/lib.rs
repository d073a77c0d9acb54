//! JSON HTTP API for NotaLink.
//!
//! Exposes an axum [`Router`] backed by any [`NoteStore`] and a generation
//! [`Orchestrator`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", notalink_api::api_router(state))
//! ```

pub mod error;
pub mod generate;
pub mod notes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use notalink_core::store::NoteStore;
use notalink_repro::{Engine, Orchestrator, TemplateSource};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S, E, T> {
  pub store:     Arc<S>,
  pub generator: Arc<Orchestrator<E, T>>,
}

impl<S, E, T> Clone for ApiState<S, E, T> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      generator: Arc::clone(&self.generator),
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, E, T>(state: ApiState<S, E, T>) -> Router<()>
where
  S: NoteStore + 'static,
  E: Engine + 'static,
  T: TemplateSource + 'static,
{
  Router::new()
    // Notes
    .route("/notes", get(notes::list::<S, E, T>).post(notes::create::<S, E, T>))
    .route("/notes/{id}", get(notes::get_one::<S, E, T>))
    // Generation
    .route("/ai/generate", post(generate::handler::<S, E, T>))
    .with_state(state)
}
