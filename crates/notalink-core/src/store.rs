//! The `NoteStore` trait.
//!
//! Implemented by storage backends (e.g. `notalink-store-fs`). The API layer
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  NoteId,
  note::{NewNote, Note},
};

/// Number of notes returned by a listing when the caller gives no limit.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Abstraction over a note repository backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait NoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a validated note and return its fully materialised form.
  ///
  /// The id is allocated here unless the caller supplied one; timestamps are
  /// always set by the store. A failed create leaves no visible partial file.
  fn create(
    &self,
    note: NewNote,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// Look a note up by id. Returns `None` if no note has that id.
  fn get<'a>(
    &'a self,
    id: &'a NoteId,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + 'a;

  /// Return at most `limit` notes, most recently modified first.
  ///
  /// Best effort: notes written concurrently may or may not be included.
  fn list_recent(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;
}
