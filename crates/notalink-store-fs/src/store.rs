//! [`FsStore`], the filesystem implementation of [`NoteStore`].

use std::{
  collections::HashMap,
  fs,
  io,
  path::{Path, PathBuf},
  sync::{Arc, PoisonError, RwLock},
  time::SystemTime,
};

use chrono::Utc;
use notalink_core::{
  NoteId,
  note::{NewNote, Note},
  store::NoteStore,
};
use tracing::{debug, info};

use crate::{
  Error, Result,
  encode::{read_note, read_note_if_exists, write_atomic},
  layout::{NOTES_DIR, note_path, walk_notes},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A note repository backed by a directory tree.
///
/// Besides the files themselves the store keeps an `id → path` side index so
/// lookups avoid a full tree walk. The index holds paths only; note content
/// is always read from disk. Entries that go stale (e.g. the tree was
/// modified by another process) are repaired by falling back to a scan.
///
/// Cloning is cheap; the index is reference-counted.
#[derive(Clone)]
pub struct FsStore {
  notes_dir: Arc<PathBuf>,
  index:     Arc<RwLock<HashMap<NoteId, PathBuf>>>,
}

impl FsStore {
  /// Open a store rooted at `data_dir` and build the side index.
  ///
  /// The `notes` subtree does not need to exist yet.
  pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
    let notes_dir = data_dir.as_ref().join(NOTES_DIR);

    let scan_dir = notes_dir.clone();
    let found = blocking(move || walk_notes(&scan_dir)).await?;

    let mut index = HashMap::with_capacity(found.len());
    for (id, path) in found {
      index.entry(id).or_insert(path);
    }
    info!(notes_dir = %notes_dir.display(), notes = index.len(), "note index built");

    Ok(Self {
      notes_dir: Arc::new(notes_dir),
      index:     Arc::new(RwLock::new(index)),
    })
  }

  /// Root of the sharded notes tree.
  pub fn notes_dir(&self) -> &Path { &self.notes_dir }

  fn indexed(&self, id: &NoteId) -> Option<PathBuf> {
    self
      .index
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(id)
      .cloned()
  }

  fn remember(&self, id: NoteId, path: PathBuf) {
    self
      .index
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(id, path);
  }

  fn forget(&self, id: &NoteId) {
    self
      .index
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(id);
  }

  /// Walk the tree for the first file named after `id`.
  async fn scan_for(&self, id: &NoteId) -> Result<Option<(PathBuf, Note)>> {
    let notes_dir = Arc::clone(&self.notes_dir);
    let wanted = id.clone();

    blocking(move || {
      let hit = walk_notes(&notes_dir)?
        .into_iter()
        .find(|(id, _)| *id == wanted);
      match hit {
        Some((_, path)) => {
          let note = read_note(&path)?;
          Ok(Some((path, note)))
        }
        None => Ok(None),
      }
    })
    .await
  }
}

/// Run blocking filesystem work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
  T: Send + 'static,
  F: FnOnce() -> Result<T> + Send + 'static,
{
  tokio::task::spawn_blocking(f).await?
}

/// Modification time of `path`, or `None` if it vanished after the walk.
fn modified(path: &Path) -> Result<Option<SystemTime>> {
  match fs::metadata(path).and_then(|m| m.modified()) {
    Ok(t) => Ok(Some(t)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(Error::io(path)(e)),
  }
}

// ─── NoteStore impl ──────────────────────────────────────────────────────────

impl NoteStore for FsStore {
  type Error = Error;

  async fn create(&self, note: NewNote) -> Result<Note> {
    let note = note.into_note(Utc::now());
    let path = note_path(&self.notes_dir, &note.id, note.created_at);

    let (note, path) = blocking(move || {
      write_atomic(&path, &note)?;
      Ok((note, path))
    })
    .await?;

    info!(note_id = %note.id, path = %path.display(), "note created");
    self.remember(note.id.clone(), path);
    Ok(note)
  }

  async fn get(&self, id: &NoteId) -> Result<Option<Note>> {
    if let Some(path) = self.indexed(id) {
      if let Some(note) = blocking(move || read_note_if_exists(&path)).await? {
        return Ok(Some(note));
      }
      debug!(note_id = %id, "indexed note file is gone; rescanning");
      self.forget(id);
    }

    match self.scan_for(id).await? {
      Some((path, note)) => {
        self.remember(id.clone(), path);
        Ok(Some(note))
      }
      None => {
        debug!(note_id = %id, "note not found");
        Ok(None)
      }
    }
  }

  async fn list_recent(&self, limit: usize) -> Result<Vec<Note>> {
    if limit == 0 {
      return Ok(Vec::new());
    }
    let notes_dir = Arc::clone(&self.notes_dir);

    blocking(move || {
      let mut files = Vec::new();
      for (_, path) in walk_notes(&notes_dir)? {
        if let Some(mtime) = modified(&path)? {
          files.push((mtime, path));
        }
      }
      // Newest first; path order keeps equal mtimes stable.
      files.sort_by(|(ta, pa), (tb, pb)| tb.cmp(ta).then_with(|| pa.cmp(pb)));

      let mut notes = Vec::with_capacity(limit.min(files.len()));
      for (_, path) in files {
        if notes.len() == limit {
          break;
        }
        if let Some(note) = read_note_if_exists(&path)? {
          notes.push(note);
        }
      }
      Ok(notes)
    })
    .await
  }
}
