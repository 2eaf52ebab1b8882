//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use footy_core::{Record, Scalar, TableSchema, store::RecordStore};
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};

use crate::{
  Result,
  sql::{self, bind, quote, unbind},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A record store backed by a single SQLite file.
///
/// The connection is owned by one background thread; statements from this
/// handle execute strictly one after another.
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a database at `path`, creating missing parent
  /// directories first.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    info!(path = %path.display(), "connected to SQLite database");
    Ok(Self { conn })
  }

  /// Open an in-memory store. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Close the connection, surfacing any error SQLite reports on close.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    info!("SQLite connection closed");
    Ok(())
  }

  async fn execute(
    &self,
    statement: String,
    params:    Vec<rusqlite::types::Value>,
  ) -> Result<usize> {
    debug!(sql = %statement, "executing statement");
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&statement, rusqlite::params_from_iter(params))?)
      })
      .await?;
    Ok(changed)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── DDL ───────────────────────────────────────────────────────────────────

  async fn ensure_table(&self, table: &str, schema: &TableSchema) -> Result<()> {
    let statement = sql::create_table(table, schema)?;
    self.execute(statement, Vec::new()).await?;
    info!(table, columns = schema.column_count(), "table checked/created");
    Ok(())
  }

  async fn ensure_unique_index(&self, table: &str, columns: &[String]) -> Result<()> {
    let statement = sql::create_unique_index(table, columns)?;
    self.execute(statement, Vec::new()).await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert(
    &self,
    table:          &str,
    record:         &Record,
    unique_columns: &[String],
  ) -> Result<()> {
    let statement = sql::upsert(table, record, unique_columns)?;
    self.execute(statement.sql, statement.params).await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn table_exists(&self, table: &str) -> Result<bool> {
    let name = table.to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
              rusqlite::params![name],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn count_rows(&self, table: &str) -> Result<u64> {
    let statement = format!("SELECT COUNT(*) FROM {}", quote(table)?);

    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&statement, [], |row| row.get(0))?))
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn fetch_row(
    &self,
    table:      &str,
    key_column: &str,
    key:        &Scalar,
  ) -> Result<Option<Record>> {
    let statement = format!(
      "SELECT * FROM {} WHERE {} = ?1 LIMIT 1",
      quote(table)?,
      quote(key_column)?
    );
    let key = bind(key);

    let row = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&statement)?;
        let names: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();

        let row = stmt
          .query_row([key], |row| {
            let mut record = Record::new();
            for (i, name) in names.iter().enumerate() {
              if let Some(value) = unbind(row.get_ref(i)?) {
                record.insert(name.clone(), value);
              }
            }
            Ok(record)
          })
          .optional()?;

        Ok(row)
      })
      .await?;

    Ok(row)
  }
}
