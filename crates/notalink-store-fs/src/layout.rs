//! On-disk layout of the notes tree.
//!
//! ```text
//! <data_dir>/notes/<YYYY>/<MM>/<id>.json
//! ```
//!
//! A note's path is a pure function of its id and creation time. Anything in
//! the tree that is not a `*.json` file with a valid id stem (temp files,
//! editor droppings) is ignored.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use notalink_core::NoteId;
use walkdir::WalkDir;

use crate::Result;

/// Name of the notes subtree below the data directory.
pub const NOTES_DIR: &str = "notes";

/// Extension of published note files.
pub const NOTE_EXT: &str = "json";

/// The year/month shard a note created at `created_at` lives in.
pub fn shard_dir(notes_dir: &Path, created_at: DateTime<Utc>) -> PathBuf {
  notes_dir
    .join(created_at.format("%Y").to_string())
    .join(created_at.format("%m").to_string())
}

pub fn note_path(
  notes_dir: &Path,
  id: &NoteId,
  created_at: DateTime<Utc>,
) -> PathBuf {
  shard_dir(notes_dir, created_at).join(format!("{id}.{NOTE_EXT}"))
}

/// The note id encoded in `path`, if it names a note file.
pub fn file_id(path: &Path) -> Option<NoteId> {
  if path.extension()? != NOTE_EXT {
    return None;
  }
  NoteId::parse(path.file_stem()?.to_str()?).ok()
}

/// Every note file below `notes_dir`, in file-name order within each
/// directory. A missing tree yields nothing.
pub fn walk_notes(notes_dir: &Path) -> Result<Vec<(NoteId, PathBuf)>> {
  if !notes_dir.exists() {
    return Ok(Vec::new());
  }

  let mut found = Vec::new();
  for entry in WalkDir::new(notes_dir).sort_by_file_name() {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }
    if let Some(id) = file_id(entry.path()) {
      found.push((id, entry.into_path()));
    }
  }
  Ok(found)
}
