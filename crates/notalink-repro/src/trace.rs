//! Append-only, fingerprint-keyed trace log.
//!
//! Layout: `<traces_dir>/<fingerprint>.jsonl`, one JSON record per line, one
//! line per generation call. The log is a history, not a cache: repeated
//! calls with the same fingerprint accumulate lines.

use std::{
  collections::HashMap,
  fs::{self, OpenOptions},
  io::{self, BufRead, BufReader, Write as _},
  path::{Path, PathBuf},
  sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Fingerprint, Result,
  generate::{GenerateRequest, TokenUsage},
};

/// One immutable entry describing a single generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
  pub req:         GenerateRequest,
  pub out:         String,
  pub usage:       TokenUsage,
  pub elapsed_ms:  u64,
  pub recorded_at: DateTime<Utc>,
}

/// Handle on the traces directory.
///
/// Appends to the same fingerprint are serialised through a per-file mutex,
/// and every record is emitted as a single `O_APPEND` write, so lines from
/// concurrent callers never interleave. A file's mutex is only kept while an
/// append to it is in flight. Cloning is cheap and clones share the locks.
#[derive(Debug, Clone)]
pub struct TraceLog {
  dir:   Arc<PathBuf>,
  locks: Arc<Mutex<HashMap<Fingerprint, Arc<Mutex<()>>>>>,
}

impl TraceLog {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir:   Arc::new(dir.into()),
      locks: Arc::default(),
    }
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Path of the JSONL file holding `fingerprint`'s history.
  pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
    self.dir.join(format!("{fingerprint}.jsonl"))
  }

  fn lock_for(&self, fingerprint: &Fingerprint) -> Arc<Mutex<()>> {
    let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(fingerprint.clone()).or_default())
  }

  /// Drop `fingerprint`'s lock from the map once no other append holds it.
  ///
  /// The count is checked under the map lock, so no new holder can appear
  /// between the check and the removal.
  fn release(&self, fingerprint: &Fingerprint, lock: Arc<Mutex<()>>) {
    let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    // One reference in the map, one held here.
    if Arc::strong_count(&lock) == 2 {
      locks.remove(fingerprint);
    }
  }

  /// Append `record` as one line. Never truncates or rewrites earlier lines.
  pub async fn append(
    &self,
    fingerprint: &Fingerprint,
    record: &TraceRecord,
  ) -> Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    let path = self.path_for(fingerprint);
    let lock = self.lock_for(fingerprint);
    let log = self.clone();
    let fingerprint = fingerprint.clone();

    tokio::task::spawn_blocking(move || -> Result<()> {
      let written = {
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        append_line(&path, &line)
      };
      log.release(&fingerprint, lock);

      written.map_err(|source| Error::Trace {
        path: path.clone(),
        source,
      })?;
      debug!(path = %path.display(), bytes = line.len(), "trace appended");
      Ok(())
    })
    .await?
  }

  /// Every record stored under `fingerprint`, oldest first. A fingerprint
  /// that was never traced has an empty history.
  pub async fn read(&self, fingerprint: &Fingerprint) -> Result<Vec<TraceRecord>> {
    let path = self.path_for(fingerprint);

    tokio::task::spawn_blocking(move || -> Result<Vec<TraceRecord>> {
      let file = match fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(Error::Trace { path, source }),
      };

      let mut records = Vec::new();
      for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| Error::Trace {
          path: path.clone(),
          source,
        })?;
        if line.trim().is_empty() {
          continue;
        }
        records.push(serde_json::from_str(&line)?);
      }
      Ok(records)
    })
    .await?
  }
}

fn append_line(path: &Path, line: &[u8]) -> io::Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  let mut file = OpenOptions::new().create(true).append(true).open(path)?;
  file.write_all(line)?;
  file.sync_data()
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use tempfile::TempDir;

  use super::*;
  use crate::fingerprint::{ParamValue, fingerprint};

  fn record(out: &str) -> TraceRecord {
    let mut variables = BTreeMap::new();
    variables.insert("text".to_owned(), "One. Two.".to_owned());
    TraceRecord {
      req:         GenerateRequest::new(variables),
      out:         out.to_owned(),
      usage:       TokenUsage::new(1, 2),
      elapsed_ms:  0,
      recorded_at: Utc::now(),
    }
  }

  fn key(prompt: &str) -> Fingerprint {
    let vars: BTreeMap<String, String> = BTreeMap::new();
    fingerprint(prompt, &vars, Vec::<(&str, &ParamValue)>::new()).unwrap()
  }

  #[tokio::test]
  async fn append_creates_directories_and_accumulates_lines() {
    let dir = TempDir::new().unwrap();
    let log = TraceLog::new(dir.path().join("nested").join("traces"));
    let fp = key("p");

    log.append(&fp, &record("first")).await.unwrap();
    log.append(&fp, &record("second")).await.unwrap();

    let raw = fs::read_to_string(log.path_for(&fp)).unwrap();
    assert_eq!(raw.lines().count(), 2);
    assert!(raw.ends_with('\n'));

    let history = log.read(&fp).await.unwrap();
    let outs: Vec<&str> = history.iter().map(|r| r.out.as_str()).collect();
    assert_eq!(outs, ["first", "second"]);
  }

  #[tokio::test]
  async fn fingerprints_get_separate_files() {
    let dir = TempDir::new().unwrap();
    let log = TraceLog::new(dir.path());

    log.append(&key("a"), &record("a")).await.unwrap();
    log.append(&key("b"), &record("b")).await.unwrap();

    assert_eq!(log.read(&key("a")).await.unwrap().len(), 1);
    assert_eq!(log.read(&key("b")).await.unwrap().len(), 1);
    assert!(log.read(&key("c")).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn finished_appends_release_their_locks() {
    let dir = TempDir::new().unwrap();
    let log = TraceLog::new(dir.path());

    for i in 0..50 {
      log.append(&key(&format!("p{i}")), &record("out")).await.unwrap();
    }
    assert!(log.locks.lock().unwrap().is_empty());
    assert_eq!(log.read(&key("p7")).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn failed_append_releases_its_lock() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("traces");
    fs::write(&blocker, "not a directory").unwrap();
    let log = TraceLog::new(&blocker);

    assert!(log.append(&key("p"), &record("out")).await.is_err());
    assert!(log.locks.lock().unwrap().is_empty());
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_appends_do_not_interleave() {
    let dir = TempDir::new().unwrap();
    let log = TraceLog::new(dir.path());
    let fp = key("shared");
    let big = "x".repeat(64 * 1024);

    let handles: Vec<_> = (0..16)
      .map(|i| {
        let (log, fp, out) = (log.clone(), fp.clone(), format!("{i}{big}"));
        tokio::spawn(async move { log.append(&fp, &record(&out)).await })
      })
      .collect();
    for h in handles {
      h.await.unwrap().unwrap();
    }

    // Every line must parse on its own.
    let history = log.read(&fp).await.unwrap();
    assert_eq!(history.len(), 16);
    assert!(history.iter().all(|r| r.out.ends_with(&big)));
    assert!(log.locks.lock().unwrap().is_empty());
  }
}
