//! Prompt template lookup.
//!
//! Templates are plain text addressed by a prompt id. [`TemplateDir`] resolves
//! `<prompts_dir>/<prompt_id>.md`; tests and embedders can supply any other
//! [`TemplateSource`].

use std::{
  collections::HashMap,
  future::Future,
  path::{Path, PathBuf},
};

use notalink_core::id::is_filename_safe;
use tracing::debug;

use crate::{Error, Result};

/// Extension of template files inside a [`TemplateDir`].
pub const TEMPLATE_EXT: &str = "md";

/// Resolves a prompt id to its template text.
pub trait TemplateSource: Send + Sync {
  /// Load the template for `prompt_id`, or fail with
  /// [`Error::TemplateNotFound`].
  fn load<'a>(
    &'a self,
    prompt_id: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;
}

/// Templates stored as markdown files in a single directory. Never written to.
#[derive(Debug, Clone)]
pub struct TemplateDir {
  root: PathBuf,
}

impl TemplateDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  fn path_for(&self, prompt_id: &str) -> Option<PathBuf> {
    is_filename_safe(prompt_id)
      .then(|| self.root.join(format!("{prompt_id}.{TEMPLATE_EXT}")))
  }
}

impl TemplateSource for TemplateDir {
  async fn load(&self, prompt_id: &str) -> Result<String> {
    let path = self
      .path_for(prompt_id)
      .ok_or_else(|| Error::TemplateNotFound(prompt_id.to_owned()))?;

    tokio::fs::read_to_string(&path).await.map_err(|e| {
      debug!(prompt_id, path = %path.display(), error = %e, "template unreadable");
      Error::TemplateNotFound(prompt_id.to_owned())
    })
  }
}

/// In-memory templates keyed by prompt id.
impl TemplateSource for HashMap<String, String> {
  async fn load(&self, prompt_id: &str) -> Result<String> {
    self
      .get(prompt_id)
      .cloned()
      .ok_or_else(|| Error::TemplateNotFound(prompt_id.to_owned()))
  }
}
