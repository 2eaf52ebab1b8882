//! Error type for `footy-ingest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(String),

  #[error("secret store error: {0}")]
  Vault(#[from] footy_vault::Error),

  #[error("football API error: {0}")]
  Collector(#[from] footy_collector::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }
}

impl From<config::ConfigError> for Error {
  fn from(err: config::ConfigError) -> Self { Error::Config(err.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
