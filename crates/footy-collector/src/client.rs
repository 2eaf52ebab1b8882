//! Async HTTP client for the football data API.

use std::time::Duration;

use footy_core::{Record, RecordSet, Scalar};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::{
  DEFAULT_BASE_URL, Error, Result,
  model::{Country, League, UpstreamError},
};

/// Connection settings for the football data API.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
  pub base_url:        String,
  pub connect_timeout: Duration,
  pub timeout:         Duration,
}

impl Default for CollectorConfig {
  fn default() -> Self {
    Self {
      base_url:        DEFAULT_BASE_URL.to_owned(),
      connect_timeout: Duration::from_secs(5),
      timeout:         Duration::from_secs(30),
    }
  }
}

/// Football data client authenticated with an API key.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct Collector {
  http:    Client,
  config:  CollectorConfig,
  api_key: String,
}

impl Collector {
  pub fn new(config: CollectorConfig, api_key: impl Into<String>) -> Result<Self> {
    let http = Client::builder()
      .connect_timeout(config.connect_timeout)
      .timeout(config.timeout)
      .build()?;
    Ok(Self { http, config, api_key: api_key.into() })
  }

  // ── Countries ─────────────────────────────────────────────────────────────

  /// `GET ?action=get_countries`
  pub async fn list_countries(&self) -> Result<Vec<Country>> {
    self.get_list("get_countries", &[]).await
  }

  /// Look up a country by exact name. `None` means the API does not know it.
  pub async fn get_country_id(&self, country_name: &str) -> Result<Option<i64>> {
    let countries = self.list_countries().await?;

    match countries.iter().find(|c| c.country_name == country_name) {
      Some(country) => {
        info!(country = country_name, country_id = country.country_id, "found country");
        Ok(Some(country.country_id))
      }
      None => {
        warn!(country = country_name, "country not found in the response");
        Ok(None)
      }
    }
  }

  // ── Leagues ───────────────────────────────────────────────────────────────

  /// `GET ?action=get_leagues&country_id=<id>`
  pub async fn list_leagues(&self, country_id: i64) -> Result<Vec<League>> {
    self
      .get_list("get_leagues", &[("country_id", country_id.to_string())])
      .await
  }

  /// Leagues of a country keyed by league id, each holding `league_name`
  /// and `season`.
  pub async fn get_leagues(&self, country_id: i64) -> Result<RecordSet> {
    let leagues: RecordSet = self
      .list_leagues(country_id)
      .await?
      .into_iter()
      .map(|league| {
        let record = Record::from([
          ("league_name".to_owned(), Scalar::Text(league.league_name)),
          ("season".to_owned(), league.league_season),
        ]);
        (league.league_id, record)
      })
      .collect();

    info!(country_id, count = leagues.len(), "found leagues");
    Ok(leagues)
  }

  // ── Transport ─────────────────────────────────────────────────────────────

  async fn get_list<T: DeserializeOwned>(
    &self,
    action: &'static str,
    params: &[(&str, String)],
  ) -> Result<Vec<T>> {
    info!(action, "requesting football data");

    let mut query: Vec<(&str, &str)> = vec![("action", action)];
    query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));
    query.push(("APIkey", self.api_key.as_str()));

    let resp = self
      .http
      .get(&self.config.base_url)
      .query(&query)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      error!(action, %status, "football data request failed");
      return Err(Error::Status { action, status });
    }

    let body: serde_json::Value = serde_json::from_str(&resp.text().await?)?;
    if body.is_object()
      && let Ok(upstream) = serde_json::from_value::<UpstreamError>(body.clone())
    {
      error!(action, code = upstream.error, message = %upstream.message, "football API error");
      return Err(Error::Upstream {
        action,
        code: upstream.error,
        message: upstream.message,
      });
    }

    let items: Vec<T> = serde_json::from_value(body)?;
    info!(action, count = items.len(), "football data received");
    Ok(items)
  }
}
