//! Response shapes for the football data API.
//!
//! The API reports numeric identifiers as strings (`"country_id": "44"`), so
//! ids accept either form.

use footy_core::Scalar;
use serde::{Deserialize, Deserializer, de};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Country {
  #[serde(deserialize_with = "numeric_id")]
  pub country_id:   i64,
  pub country_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct League {
  #[serde(deserialize_with = "numeric_id")]
  pub league_id:     i64,
  pub league_name:   String,
  pub league_season: Scalar,
}

/// Error object returned in place of a list, e.g.
/// `{"error": 404, "message": "No country found"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamError {
  pub error:   i64,
  #[serde(default)]
  pub message: String,
}

fn numeric_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  match Scalar::deserialize(deserializer)? {
    Scalar::Integer(id) => Ok(id),
    Scalar::Text(s) => s
      .trim()
      .parse()
      .map_err(|_| de::Error::custom(format!("expected a numeric id, got {s:?}"))),
  }
}
