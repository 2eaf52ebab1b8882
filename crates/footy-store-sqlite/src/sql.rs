//! Statement builders and value conversion between [`Scalar`] and SQLite.
//!
//! Every identifier is validated with
//! [`footy_core::schema::validate_identifier`] and then double-quoted, so
//! table and column names never need escaping. Values are always bound as
//! parameters: `Integer` as a native integer, `Text` as text.

use footy_core::{
  Error as CoreError, Record, Scalar, TableSchema, schema::validate_identifier,
};
use rusqlite::types::{Value, ValueRef};

use crate::Result;

pub fn quote(ident: &str) -> Result<String> {
  validate_identifier(ident)?;
  Ok(format!("\"{ident}\""))
}

// ─── DDL ─────────────────────────────────────────────────────────────────────

pub fn create_table(table: &str, schema: &TableSchema) -> Result<String> {
  let table = quote(table)?;
  let columns = schema
    .column_definitions()
    .into_iter()
    .map(|(name, ty)| -> Result<String> { Ok(format!("{} {ty}", quote(name)?)) })
    .collect::<Result<Vec<_>>>()?;

  Ok(format!("CREATE TABLE IF NOT EXISTS {table} ({})", columns.join(", ")))
}

pub fn create_unique_index(table: &str, columns: &[String]) -> Result<String> {
  if columns.is_empty() {
    return Err(CoreError::EmptyConflictTarget.into());
  }
  // Length prefixes keep `[a_b, c]` and `[a, b_c]` from sharing a name.
  let encoded: Vec<String> = columns.iter().map(|c| format!("{}{c}", c.len())).collect();
  let index = quote(&format!("{table}_{}_key", encoded.join("_")))?;
  let quoted = quote_all(columns)?;

  Ok(format!(
    "CREATE UNIQUE INDEX IF NOT EXISTS {index} ON {} ({})",
    quote(table)?,
    quoted.join(", ")
  ))
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

/// A built upsert statement with its positional parameters.
#[derive(Debug)]
pub struct Upsert {
  pub sql:    String,
  pub params: Vec<Value>,
}

/// Build `INSERT … ON CONFLICT (unique) DO UPDATE SET …` for `record`.
///
/// Every record column outside `unique_columns` is overwritten from
/// `excluded`. When the record has no such column the conflict resolves to
/// `DO NOTHING`.
pub fn upsert(table: &str, record: &Record, unique_columns: &[String]) -> Result<Upsert> {
  if record.is_empty() {
    return Err(CoreError::EmptyRecord.into());
  }
  if unique_columns.is_empty() {
    return Err(CoreError::EmptyConflictTarget.into());
  }

  let mut conflict: Vec<&str> = Vec::with_capacity(unique_columns.len());
  for column in unique_columns {
    if !record.contains_key(column) {
      return Err(CoreError::ConflictColumnMissing(column.clone()).into());
    }
    if !conflict.contains(&column.as_str()) {
      conflict.push(column);
    }
  }

  let mut columns      = Vec::with_capacity(record.len());
  let mut placeholders = Vec::with_capacity(record.len());
  let mut assignments  = Vec::new();
  let mut params       = Vec::with_capacity(record.len());

  for (i, (name, value)) in record.iter().enumerate() {
    let quoted = quote(name)?;
    if !conflict.contains(&name.as_str()) {
      assignments.push(format!("{quoted} = excluded.{quoted}"));
    }
    columns.push(quoted);
    placeholders.push(format!("?{}", i + 1));
    params.push(bind(value));
  }

  let action = if assignments.is_empty() {
    "DO NOTHING".to_owned()
  } else {
    format!("DO UPDATE SET {}", assignments.join(", "))
  };

  let conflict = conflict
    .into_iter()
    .map(quote)
    .collect::<Result<Vec<_>>>()?;

  let sql = format!(
    "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) {action}",
    quote(table)?,
    columns.join(", "),
    placeholders.join(", "),
    conflict.join(", "),
  );

  Ok(Upsert { sql, params })
}

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn bind(value: &Scalar) -> Value {
  match value {
    Scalar::Integer(i) => Value::Integer(*i),
    Scalar::Text(s) => Value::Text(s.clone()),
  }
}

/// Read a column back as a [`Scalar`]. `NULL` has no scalar form; reals and
/// blobs, which this crate never writes, come back as text.
pub fn unbind(value: ValueRef<'_>) -> Option<Scalar> {
  match value {
    ValueRef::Null => None,
    ValueRef::Integer(i) => Some(Scalar::Integer(i)),
    ValueRef::Real(f) => Some(Scalar::Text(f.to_string())),
    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
      Some(Scalar::Text(String::from_utf8_lossy(bytes).into_owned()))
    }
  }
}

fn quote_all(columns: &[String]) -> Result<Vec<String>> {
  columns.iter().map(|c| quote(c)).collect()
}
