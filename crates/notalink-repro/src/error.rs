//! Error type for `notalink-repro`.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Unknown, unsafe or unreadable prompt id. Raised before the engine runs.
  #[error("template not found: {0}")]
  TemplateNotFound(String),

  #[error("invalid request: {0}")]
  InvalidRequest(String),

  #[error("engine error: {0}")]
  Engine(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("trace log error at {}: {source}", path.display())]
  Trace {
    path:   PathBuf,
    source: io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("blocking task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
