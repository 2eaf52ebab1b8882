//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `footy-store-sqlite`). The ingest
//! orchestrator depends on this abstraction, not on a concrete backend.

use std::future::Future;

use crate::{Record, Scalar, TableSchema};

/// A relational sink for flat records with schema created on demand.
///
/// A backend instance owns its connection exclusively; callers issue one
/// operation at a time and await it before the next.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── DDL ───────────────────────────────────────────────────────────────

  /// Create `table` from `schema` if it does not exist.
  ///
  /// Idempotent. An existing table is left as-is even if its columns differ
  /// from `schema`.
  fn ensure_table<'a>(
    &'a self,
    table: &'a str,
    schema: &'a TableSchema,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Create a unique index over `columns` if it does not exist, so they can
  /// serve as an upsert conflict target.
  fn ensure_unique_index<'a>(
    &'a self,
    table: &'a str,
    columns: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert `record`, or on a conflict over `unique_columns` overwrite every
  /// other column of the existing row. Executes as one atomic statement.
  ///
  /// `record` must be non-empty and `unique_columns` a non-empty subset of
  /// its keys.
  fn upsert<'a>(
    &'a self,
    table: &'a str,
    record: &'a Record,
    unique_columns: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn table_exists<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn count_rows<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Fetch the row whose `key_column` equals `key`. `NULL` columns are
  /// omitted from the returned record.
  fn fetch_row<'a>(
    &'a self,
    table: &'a str,
    key_column: &'a str,
    key: &'a Scalar,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;
}
