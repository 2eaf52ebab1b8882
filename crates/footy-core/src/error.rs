//! Error types for `footy-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid SQL identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("cannot upsert an empty record")]
  EmptyRecord,

  #[error("upsert requires at least one unique column")]
  EmptyConflictTarget,

  /// A declared unique column is not one of the record's fields.
  #[error("unique column {0:?} is not present in the record")]
  ConflictColumnMissing(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
