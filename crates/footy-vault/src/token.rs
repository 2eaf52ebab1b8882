//! Cached bearer token and its freshness window.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Tokens are considered expired this many seconds before the issuer's
/// deadline, or half their lifetime when that is shorter.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Upper bound on a reported lifetime, one year.
const MAX_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Successful body of the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
  pub access_token: String,
  #[serde(default)]
  pub expires_in:   Option<i64>,
}

/// A bearer token held in memory only.
#[derive(Clone)]
pub struct AccessToken {
  value:      String,
  expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
  pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
    Self { value: value.into(), expires_at }
  }

  pub(crate) fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
    let expires_at = response
      .expires_in
      .map(|secs| secs.clamp(0, MAX_LIFETIME_SECS))
      .map(|secs| secs - EXPIRY_SKEW_SECS.min(secs / 2))
      .map(|secs| issued_at + Duration::seconds(secs));
    Self::new(response.access_token, expires_at)
  }

  pub fn value(&self) -> &str { &self.value }

  pub fn expires_at(&self) -> Option<DateTime<Utc>> { self.expires_at }

  /// A token without a reported lifetime never expires on our side.
  pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_none_or(|deadline| now < deadline)
  }
}

impl fmt::Debug for AccessToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AccessToken")
      .field("value", &"<redacted>")
      .field("expires_at", &self.expires_at)
      .finish()
  }
}
