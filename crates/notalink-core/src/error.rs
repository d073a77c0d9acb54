//! Error types for `notalink-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The payload violates the note schema. Raised before anything is written.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("invalid id {0:?}: expected 1-128 characters of [A-Za-z0-9._-], not starting with '.'")]
  InvalidId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
