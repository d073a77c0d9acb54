//! Error type for `notalink-store-fs`.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error at {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    source: io::Error,
  },

  /// A note file exists but does not hold a valid note. Never skipped.
  #[error("corrupt note file {}: {source}", path.display())]
  Corrupt {
    path:   PathBuf,
    source: serde_json::Error,
  },

  /// The temporary file could not be renamed into place. It has already
  /// been removed.
  #[error("failed to publish {}: {source}", path.display())]
  Persist {
    path:   PathBuf,
    source: io::Error,
  },

  #[error("directory walk failed: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("blocking task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl Error {
  /// Adapter for `map_err` that tags an [`io::Error`] with its path.
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
    let path = path.into();
    move |source| Self::Io { path, source }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
