//! Error type for `footy-collector`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("{action} returned {status}")]
  Status { action: &'static str, status: StatusCode },

  /// The API answered 200 with an error object instead of a result list.
  #[error("{action} rejected by upstream ({code}): {message}")]
  Upstream { action: &'static str, code: i64, message: String },

  #[error("malformed response: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
