//! Table schemas and their inference from a [`RecordSet`].
//!
//! Schemas are derived, never declared up front: the collector hands over a
//! record set and the column set falls out of whatever fields it carries.

use std::{collections::BTreeMap, fmt};

use crate::{Error, RecordSet, Result, Scalar};

// ─── Column types ────────────────────────────────────────────────────────────

/// Storage type tag for a non-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  Text,
}

impl ColumnType {
  pub fn of(value: &Scalar) -> Self {
    match value {
      Scalar::Integer(_) => ColumnType::Integer,
      Scalar::Text(_) => ColumnType::Text,
    }
  }

  /// Combine two observations of the same field. Disagreement widens to
  /// `TEXT`, which can hold either.
  pub fn widen(self, other: ColumnType) -> ColumnType {
    if self == other { self } else { ColumnType::Text }
  }

  pub fn as_sql(self) -> &'static str {
    match self {
      ColumnType::Integer => "INTEGER",
      ColumnType::Text => "TEXT",
    }
  }
}

impl fmt::Display for ColumnType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_sql())
  }
}

/// SQL type of the designated primary-key column.
pub const PRIMARY_KEY_SQL: &str = "INTEGER PRIMARY KEY";

// ─── TableSchema ─────────────────────────────────────────────────────────────

/// Column layout for a single entity table.
///
/// Exactly one column is the primary key and is always rendered as
/// `INTEGER PRIMARY KEY`; the rest map to a [`ColumnType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
  primary_key: String,
  columns:     BTreeMap<String, ColumnType>,
}

impl TableSchema {
  pub fn new(primary_key: impl Into<String>) -> Self {
    Self {
      primary_key: primary_key.into(),
      columns:     BTreeMap::new(),
    }
  }

  /// Add (or retype) a column. Naming the primary key is a no-op.
  pub fn with_column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
    let name = name.into();
    if name != self.primary_key {
      self.columns.insert(name, ty);
    }
    self
  }

  pub fn primary_key(&self) -> &str { &self.primary_key }

  /// Type of a non-key column, or `None` for the primary key and unknown
  /// names.
  pub fn column_type(&self, name: &str) -> Option<ColumnType> {
    self.columns.get(name).copied()
  }

  /// Non-key columns in name order.
  pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnType)> + '_ {
    self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
  }

  /// Total number of columns, primary key included.
  pub fn column_count(&self) -> usize { self.columns.len() + 1 }

  /// `(name, sql type)` pairs in DDL order: primary key first, then the
  /// remaining columns by name.
  pub fn column_definitions(&self) -> Vec<(&str, &'static str)> {
    std::iter::once((self.primary_key.as_str(), PRIMARY_KEY_SQL))
      .chain(self.columns().map(|(name, ty)| (name, ty.as_sql())))
      .collect()
  }

  /// Check every column name is a plain SQL identifier.
  pub fn validate(&self) -> Result<()> {
    validate_identifier(&self.primary_key)?;
    for name in self.columns.keys() {
      validate_identifier(name)?;
    }
    Ok(())
  }
}

// ─── Inference ───────────────────────────────────────────────────────────────

/// Derive a [`TableSchema`] from every field seen in `records`.
///
/// Integer values give `INTEGER`, text gives `TEXT`; a field seen with both
/// is widened to `TEXT`. `primary_key` is always the `INTEGER PRIMARY KEY`
/// column even if a record carries a conflicting value under that name.
pub fn infer_schema(records: &RecordSet, primary_key: &str) -> TableSchema {
  let mut columns: BTreeMap<String, ColumnType> = BTreeMap::new();

  for (_, record) in records.iter() {
    for (field, value) in record {
      if field == primary_key {
        continue;
      }
      let observed = ColumnType::of(value);
      columns
        .entry(field.clone())
        .and_modify(|ty| *ty = ty.widen(observed))
        .or_insert(observed);
    }
  }

  TableSchema { primary_key: primary_key.to_owned(), columns }
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Accept `[A-Za-z_][A-Za-z0-9_]*`; everything else is rejected before it can
/// reach a SQL statement.
pub fn validate_identifier(name: &str) -> Result<()> {
  let mut chars = name.chars();
  let valid = match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => {
      chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
    _ => false,
  };

  if valid {
    Ok(())
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}
