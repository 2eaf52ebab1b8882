//! `footy`: load a country's football leagues into SQLite.
//!
//! Reads `footy.toml` (or the path given with `--config`) plus the
//! environment, fetches the football API key from the secret store, and
//! upserts the country's leagues into the configured table.
//!
//! ```sh
//! VLT_ORG_ID=… VLT_PROJECT_ID=… VLT_APP=… HCP_CLIENT_ID=… HCP_CLIENT_SECRET=… \
//!   footy --country Brazil --db temp/footy.sqlite3
//! ```

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::Parser;
use footy_ingest::{Pipeline, RunOutcome};
use footy_store_sqlite::SqliteStore;
use footy_vault::VaultClient;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Load a country's football leagues into SQLite")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "footy.toml")]
  config: PathBuf,

  /// Country whose leagues to load (overrides `country`).
  #[arg(long)]
  country: Option<String>,

  /// SQLite database file (overrides `store_path`).
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = footy_ingest::config::load(Some(cli.config.as_path()))
    .context("failed to load configuration")?;
  if let Some(country) = cli.country {
    settings.country = country;
  }
  if let Some(db) = cli.db {
    settings.store_path = db;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  let vault = VaultClient::new(settings.vault.vault_config())
    .context("failed to build secret store client")?;

  let mut pipeline = Pipeline::new(
    vault,
    settings.vault.secret_path(),
    settings.football.collector_config(),
    store,
    settings.table.clone(),
  );

  let outcome = pipeline.run(&settings.country).await;
  let closed = pipeline.into_store().close().await;

  let outcome = settle(outcome, closed)?;

  match outcome {
    RunOutcome::Completed(summary) => {
      tracing::info!(
        country_id = summary.country_id,
        leagues = summary.leagues,
        "ingestion finished"
      );
      Ok(())
    }
    RunOutcome::CountryNotFound { country } => {
      tracing::warn!(%country, "country not found; nothing stored");
      Ok(())
    }
    RunOutcome::SecretNotFound => {
      bail!("no API key found in the secret store for app {:?}", settings.vault.app_name)
    }
  }
}

/// Combine the run result with the store's close result. A run error wins;
/// a close failure alongside it is logged rather than lost.
fn settle<T>(
  outcome: footy_ingest::Result<T>,
  closed: Result<(), footy_store_sqlite::Error>,
) -> anyhow::Result<T> {
  match outcome {
    Ok(outcome) => {
      closed.context("failed to close store")?;
      Ok(outcome)
    }
    Err(run_err) => {
      if let Err(close_err) = closed {
        tracing::error!(error = %close_err, "failed to close store");
      }
      Err(run_err).context("ingestion run failed")
    }
  }
}
