//! Reading and atomically publishing note files.

use std::{
  fs,
  io::{self, Write as _},
  path::Path,
};

use notalink_core::note::Note;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Write `note` to `path` so that readers only ever see the old state or the
/// complete new file.
///
/// The JSON is written to a temp file in the destination directory, synced,
/// then renamed over `path`. If any step fails the temp file is deleted when
/// it is dropped.
pub fn write_atomic(path: &Path, note: &Note) -> Result<()> {
  let dir = path.parent().unwrap_or_else(|| Path::new("."));
  fs::create_dir_all(dir).map_err(Error::io(dir))?;

  let bytes = serde_json::to_vec_pretty(note)?;

  let mut tmp = NamedTempFile::new_in(dir).map_err(Error::io(dir))?;
  tmp.write_all(&bytes).map_err(Error::io(tmp.path()))?;
  tmp.as_file().sync_all().map_err(Error::io(tmp.path()))?;

  tmp.persist(path).map_err(|e| Error::Persist {
    path:   path.to_path_buf(),
    source: e.error,
  })?;
  Ok(())
}

/// Read and decode the note at `path`. Malformed content is an error.
pub fn read_note(path: &Path) -> Result<Note> {
  let bytes = fs::read(path).map_err(Error::io(path))?;
  decode(path, &bytes)
}

/// Like [`read_note`], but a file that has vanished yields `None`.
pub fn read_note_if_exists(path: &Path) -> Result<Option<Note>> {
  match fs::read(path) {
    Ok(bytes) => decode(path, &bytes).map(Some),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(Error::io(path)(e)),
  }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Note> {
  serde_json::from_slice(bytes).map_err(|source| Error::Corrupt {
    path: path.to_path_buf(),
    source,
  })
}
