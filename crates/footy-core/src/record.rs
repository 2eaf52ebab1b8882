//! Flat records and the keyed sets the collector produces.
//!
//! Values are restricted to a closed set of scalar variants so that schema
//! inference and parameter binding can match on them rather than inspect
//! arbitrary JSON.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

// ─── Scalar ──────────────────────────────────────────────────────────────────

/// A single field value.
///
/// Deserialises from either a JSON integer or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Integer(i64),
  Text(String),
}

impl Scalar {
  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Scalar::Integer(i) => Some(*i),
      Scalar::Text(_) => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Scalar::Integer(_) => None,
      Scalar::Text(s) => Some(s),
    }
  }
}

impl fmt::Display for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scalar::Integer(i) => write!(f, "{i}"),
      Scalar::Text(s) => f.write_str(s),
    }
  }
}

impl From<i64> for Scalar {
  fn from(value: i64) -> Self { Scalar::Integer(value) }
}

impl From<String> for Scalar {
  fn from(value: String) -> Self { Scalar::Text(value) }
}

impl From<&str> for Scalar {
  fn from(value: &str) -> Self { Scalar::Text(value.to_owned()) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A flat record: field name → scalar value.
pub type Record = BTreeMap<String, Scalar>;

// ─── RecordSet ───────────────────────────────────────────────────────────────

/// Records keyed by their natural identifier (e.g. a league id).
///
/// Iteration is in ascending identifier order; the orchestrator upserts in
/// exactly this order, so for duplicate keys the later insert wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
  records: BTreeMap<i64, Record>,
}

impl RecordSet {
  pub fn new() -> Self { Self::default() }

  /// Insert a record, replacing any previous record with the same id.
  pub fn insert(&mut self, id: i64, record: Record) -> Option<Record> {
    self.records.insert(id, record)
  }

  pub fn get(&self, id: i64) -> Option<&Record> { self.records.get(&id) }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (i64, &Record)> + '_ {
    self.records.iter().map(|(id, r)| (*id, r))
  }

  /// Yield each record with its identifier injected as `key_column`.
  ///
  /// A field already named `key_column` is overwritten by the identifier.
  pub fn rows<'a>(&'a self, key_column: &'a str) -> impl Iterator<Item = Record> + 'a {
    self.records.iter().map(move |(id, record)| {
      let mut row = record.clone();
      row.insert(key_column.to_owned(), Scalar::Integer(*id));
      row
    })
  }
}

impl FromIterator<(i64, Record)> for RecordSet {
  fn from_iter<I: IntoIterator<Item = (i64, Record)>>(iter: I) -> Self {
    Self { records: iter.into_iter().collect() }
  }
}

impl<'a> IntoIterator for &'a RecordSet {
  type Item = (&'a i64, &'a Record);
  type IntoIter = std::collections::btree_map::Iter<'a, i64, Record>;

  fn into_iter(self) -> Self::IntoIter { self.records.iter() }
}
