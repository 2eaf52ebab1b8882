//! Error type for `footy-vault`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Client id or secret was empty.
  #[error("missing client credentials: {0} is empty")]
  MissingCredentials(&'static str),

  /// Connection failure, timeout, or other transport-level problem.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The token or secret endpoint answered with a non-success status.
  #[error("authentication failed ({status}): {body}")]
  Authentication { status: StatusCode, body: String },

  #[error("malformed response: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
