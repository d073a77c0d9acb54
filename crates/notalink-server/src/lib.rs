//! Process wiring for the NotaLink server: configuration, directory
//! bootstrap, and assembly of the HTTP application.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use notalink_api::{ApiState, api_router};
use notalink_repro::{ExtractiveEngine, Orchestrator, TemplateDir, TraceLog};
use notalink_store_fs::FsStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration. Built once in `main` and handed to each component.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
  pub host:        String,
  pub port:        u16,
  /// Root of the note repository; notes live under `<data_dir>/notes`.
  pub data_dir:    PathBuf,
  pub traces_dir:  PathBuf,
  /// Directory of `<prompt_id>.md` templates. Only ever read.
  pub prompts_dir: PathBuf,
}

impl Settings {
  /// Environment variable prefix, e.g. `NOTALINK_DATA_DIR`.
  pub const ENV_PREFIX: &'static str = "NOTALINK";

  /// Load defaults, then the TOML file at `path` if it exists, then
  /// `NOTALINK_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8000)?
      .set_default("data_dir", "var/data")?
      .set_default("traces_dir", "var/traces")?
      .set_default("prompts_dir", "prompts")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(Self::ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  /// Create the writable directories the core expects.
  pub fn ensure_dirs(&self) -> std::io::Result<()> {
    std::fs::create_dir_all(self.data_dir.join("notes"))?;
    std::fs::create_dir_all(&self.traces_dir)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Open the store and assemble the router described by `settings`.
pub async fn build_app(settings: &Settings) -> anyhow::Result<Router> {
  let store = FsStore::open(&settings.data_dir).await.with_context(|| {
    format!("failed to open note store at {:?}", settings.data_dir)
  })?;

  let generator = Orchestrator::new(
    ExtractiveEngine,
    TemplateDir::new(&settings.prompts_dir),
    TraceLog::new(&settings.traces_dir),
  );

  let state = ApiState {
    store:     Arc::new(store),
    generator: Arc::new(generator),
  };

  Ok(api_router(state).layer(TraceLayer::new_for_http()))
}
