//! notalink server binary.
//!
//! Reads `notalink.toml` (or the path given with `--config`) plus `NOTALINK_*`
//! environment variables, prepares the data directories, and serves the JSON
//! API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use notalink_server::{Settings, build_app};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "NotaLink note repository server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "notalink.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config).context("failed to load configuration")?;
  settings
    .ensure_dirs()
    .context("failed to create data directories")?;

  let app = build_app(&settings).await?;
  let address = settings.address();

  tracing::info!(
    data_dir = %settings.data_dir.display(),
    traces_dir = %settings.traces_dir.display(),
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
