//! The ingestion run: secret → country → leagues → table.
//!
//! Every step is awaited before the next one starts and records are upserted
//! one at a time in record-set order. A failed upsert aborts the run; rows
//! written before it stay committed.

use footy_collector::{Collector, CollectorConfig, LEAGUE_ID};
use footy_core::{RecordSet, infer_schema, store::RecordStore};
use footy_vault::{SecretPath, VaultClient};
use tracing::{debug, error, info, warn};

use crate::{Error, Result};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// How a run ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
  /// The secret store holds no API key for the configured app.
  SecretNotFound,
  /// The football API does not list the requested country. Nothing was
  /// requested or stored after the lookup.
  CountryNotFound { country: String },
  Completed(RunSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub country_id:    i64,
  /// Leagues returned by the API and upserted.
  pub leagues:       usize,
  /// Rows in the table after the run.
  pub rows_in_table: u64,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// One ingestion session over a credential session and a store.
pub struct Pipeline<S> {
  vault:          VaultClient,
  secret_path:    SecretPath,
  collector:      CollectorConfig,
  store:          S,
  table:          String,
  unique_columns: Vec<String>,
}

impl<S: RecordStore> Pipeline<S> {
  /// Leagues are keyed and deduplicated on `league_id`.
  pub fn new(
    vault: VaultClient,
    secret_path: SecretPath,
    collector: CollectorConfig,
    store: S,
    table: impl Into<String>,
  ) -> Self {
    Self {
      vault,
      secret_path,
      collector,
      store,
      table: table.into(),
      unique_columns: vec![LEAGUE_ID.to_owned()],
    }
  }

  /// Use a different conflict target for upserts. A unique index over the
  /// columns is created alongside the table.
  pub fn with_unique_columns(mut self, columns: Vec<String>) -> Self {
    self.unique_columns = columns;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn into_store(self) -> S { self.store }

  /// Fetch the leagues of `country` and store them.
  pub async fn run(&mut self, country: &str) -> Result<RunOutcome> {
    let Some(api_key) = self.vault.fetch_secret(&self.secret_path).await? else {
      warn!("no API key secret available, stopping");
      return Ok(RunOutcome::SecretNotFound);
    };

    let collector = Collector::new(self.collector.clone(), api_key)?;

    let Some(country_id) = collector.get_country_id(country).await? else {
      return Ok(RunOutcome::CountryNotFound { country: country.to_owned() });
    };

    let leagues = collector.get_leagues(country_id).await?;
    let stored = self.store_leagues(&leagues).await?;
    let rows_in_table = if stored == 0 {
      0
    } else {
      self.store.count_rows(&self.table).await.map_err(Error::store)?
    };

    let summary = RunSummary { country_id, leagues: stored, rows_in_table };
    info!(
      country,
      country_id,
      leagues = summary.leagues,
      rows = summary.rows_in_table,
      "run completed"
    );
    Ok(RunOutcome::Completed(summary))
  }

  /// Infer a schema from `leagues`, ensure the table, then upsert every
  /// league with its id injected as `league_id`. Returns the number of
  /// upserts. An empty set touches nothing.
  pub async fn store_leagues(&self, leagues: &RecordSet) -> Result<usize> {
    if leagues.is_empty() {
      warn!(table = %self.table, "no leagues to store");
      return Ok(0);
    }

    let schema = infer_schema(leagues, LEAGUE_ID);
    self
      .store
      .ensure_table(&self.table, &schema)
      .await
      .map_err(Error::store)?;

    if self.unique_columns != [schema.primary_key()] {
      self
        .store
        .ensure_unique_index(&self.table, &self.unique_columns)
        .await
        .map_err(Error::store)?;
    }

    let mut stored = 0;
    for row in leagues.rows(LEAGUE_ID) {
      let league_id = &row[LEAGUE_ID];
      if let Err(err) = self
        .store
        .upsert(&self.table, &row, &self.unique_columns)
        .await
      {
        error!(%league_id, stored, "upsert failed, aborting run");
        return Err(Error::store(err));
      }
      debug!(%league_id, "league upserted");
      stored += 1;
    }

    info!(table = %self.table, stored, "leagues stored");
    Ok(stored)
  }
}
