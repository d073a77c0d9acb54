//! Note identifiers and the allocator that produces them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Longest identifier accepted from callers.
pub const MAX_ID_LEN: usize = 128;

/// Whether `s` can be used verbatim as a single path component.
///
/// Accepts 1-128 characters of `[A-Za-z0-9._-]` that do not start with `.`,
/// which rules out separators, `.`/`..`, hidden files and temp-file names.
pub fn is_filename_safe(s: &str) -> bool {
  !s.is_empty()
    && s.len() <= MAX_ID_LEN
    && !s.starts_with('.')
    && s
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Opaque, immutable note identifier. Doubles as the note's file stem.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
  /// Allocate a fresh identifier (random UUIDv4, hyphenated lowercase).
  ///
  /// Pure generation; never touches storage.
  pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

  /// Accept a caller-supplied id verbatim, checking only filename safety.
  pub fn parse(s: impl Into<String>) -> Result<Self> {
    let s = s.into();
    if is_filename_safe(&s) { Ok(Self(s)) } else { Err(Error::InvalidId(s)) }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for NoteId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(s) }
}

impl From<NoteId> for String {
  fn from(id: NoteId) -> Self { id.0 }
}

impl AsRef<str> for NoteId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for NoteId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
