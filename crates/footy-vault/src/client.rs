//! HTTP client for the token and secrets endpoints.

use std::{fmt, time::Duration};

use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
  DEFAULT_API_BASE_URL, DEFAULT_AUDIENCE, DEFAULT_TOKEN_URL, Error, Result,
  SECRETS_API_VERSION,
  token::{AccessToken, TokenResponse},
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Credentials and endpoints for one credential session.
#[derive(Clone)]
pub struct VaultConfig {
  pub client_id:       String,
  pub client_secret:   String,
  pub token_url:       String,
  pub api_base_url:    String,
  pub audience:        String,
  pub connect_timeout: Duration,
  pub timeout:         Duration,
}

impl VaultConfig {
  /// Config for the public endpoints with default timeouts.
  pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
    Self {
      client_id:       client_id.into(),
      client_secret:   client_secret.into(),
      token_url:       DEFAULT_TOKEN_URL.to_owned(),
      api_base_url:    DEFAULT_API_BASE_URL.to_owned(),
      audience:        DEFAULT_AUDIENCE.to_owned(),
      connect_timeout: Duration::from_secs(5),
      timeout:         Duration::from_secs(30),
    }
  }
}

impl fmt::Debug for VaultConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VaultConfig")
      .field("client_id", &self.client_id)
      .field("client_secret", &"<redacted>")
      .field("token_url", &self.token_url)
      .field("api_base_url", &self.api_base_url)
      .field("audience", &self.audience)
      .field("connect_timeout", &self.connect_timeout)
      .field("timeout", &self.timeout)
      .finish()
  }
}

/// Location of an application's secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPath {
  pub organization_id: String,
  pub project_id:      String,
  pub app_name:        String,
}

impl SecretPath {
  pub fn new(
    organization_id: impl Into<String>,
    project_id: impl Into<String>,
    app_name: impl Into<String>,
  ) -> Self {
    Self {
      organization_id: organization_id.into(),
      project_id:      project_id.into(),
      app_name:        app_name.into(),
    }
  }

  /// `/secrets/<version>/organizations/<org>/projects/<proj>/apps/<app>/open`
  fn open_path(&self) -> String {
    format!(
      "/secrets/{SECRETS_API_VERSION}/organizations/{}/projects/{}/apps/{}/open",
      self.organization_id, self.project_id, self.app_name
    )
  }
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OpenSecretsResponse {
  #[serde(default)]
  secrets: Vec<OpenSecret>,
}

#[derive(Debug, Deserialize)]
struct OpenSecret {
  #[serde(default)]
  version: Option<SecretVersion>,
}

#[derive(Debug, Deserialize)]
struct SecretVersion {
  #[serde(default)]
  value: Option<String>,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// A single credential session.
///
/// The access token is fetched lazily on the first secret read and reused
/// until it expires or is invalidated. Methods that may replace the token
/// take `&mut self`; the session is not meant to be shared.
pub struct VaultClient {
  http:   Client,
  config: VaultConfig,
  token:  Option<AccessToken>,
}

impl VaultClient {
  pub fn new(config: VaultConfig) -> Result<Self> {
    if config.client_id.is_empty() {
      return Err(Error::MissingCredentials("client_id"));
    }
    if config.client_secret.is_empty() {
      return Err(Error::MissingCredentials("client_secret"));
    }

    let http = Client::builder()
      .connect_timeout(config.connect_timeout)
      .timeout(config.timeout)
      .build()?;

    Ok(Self { http, config, token: None })
  }

  pub fn config(&self) -> &VaultConfig { &self.config }

  /// Whether a token is cached, fresh or not.
  pub fn has_token(&self) -> bool { self.token.is_some() }

  /// Drop the cached token so the next read performs a new exchange.
  pub fn invalidate_token(&mut self) { self.token = None; }

  // ── Tokens ────────────────────────────────────────────────────────────────

  /// Exchange the client credentials for a new bearer token and cache it.
  ///
  /// Not retried: a rejected exchange surfaces as
  /// [`Error::Authentication`].
  pub async fn acquire_token(&mut self) -> Result<String> {
    let form = [
      ("client_id", self.config.client_id.as_str()),
      ("client_secret", self.config.client_secret.as_str()),
      ("grant_type", "client_credentials"),
      ("audience", self.config.audience.as_str()),
    ];

    info!("requesting new access token");
    let issued_at = Utc::now();
    let resp = self
      .http
      .post(&self.config.token_url)
      .form(&form)
      .send()
      .await?;

    let body: TokenResponse = serde_json::from_str(&success_body(resp).await?)?;
    let token = AccessToken::from_response(body, issued_at);
    let value = token.value().to_owned();
    self.token = Some(token);

    info!("access token obtained");
    Ok(value)
  }

  /// Return the cached token, exchanging credentials only if none is cached
  /// or the cached one has expired.
  pub async fn ensure_token(&mut self) -> Result<String> {
    if let Some(token) = self.token.as_ref().filter(|t| t.is_fresh(Utc::now())) {
      return Ok(token.value().to_owned());
    }

    if self.token.is_some() {
      info!("cached access token expired, fetching a new one");
    } else {
      info!("no access token cached, fetching a new one");
    }
    self.acquire_token().await
  }

  // ── Secrets ───────────────────────────────────────────────────────────────

  /// Read the current value of the first secret under `path`.
  ///
  /// Returns `Ok(None)` when the app has no secrets. If a token reused from
  /// an earlier call is rejected with `401`, it is discarded and the read is
  /// retried once with a freshly exchanged token.
  pub async fn fetch_secret(&mut self, path: &SecretPath) -> Result<Option<String>> {
    let url = format!(
      "{}{}",
      self.config.api_base_url.trim_end_matches('/'),
      path.open_path()
    );

    let reused = self
      .token
      .as_ref()
      .is_some_and(|t| t.is_fresh(Utc::now()));
    let token = self.ensure_token().await?;

    info!(app = %path.app_name, "requesting secret");
    let mut resp = self.open_secrets(&url, &token).await?;

    if reused && resp.status() == StatusCode::UNAUTHORIZED {
      warn!("cached access token rejected, retrying with a new one");
      self.invalidate_token();
      let token = self.acquire_token().await?;
      resp = self.open_secrets(&url, &token).await?;
    }

    let opened: OpenSecretsResponse = serde_json::from_str(&success_body(resp).await?)?;
    let value = opened
      .secrets
      .into_iter()
      .next()
      .and_then(|secret| secret.version)
      .and_then(|version| version.value);
    let Some(value) = value else {
      warn!(app = %path.app_name, "no secret value found in the response");
      return Ok(None);
    };

    info!(app = %path.app_name, "secret retrieved");
    Ok(Some(value))
  }

  async fn open_secrets(&self, url: &str, token: &str) -> Result<Response> {
    Ok(self.http.get(url).bearer_auth(token).send().await?)
  }
}

/// Read the body of a successful response, or turn any other status into
/// [`Error::Authentication`] carrying the upstream body.
async fn success_body(resp: Response) -> Result<String> {
  let status = resp.status();
  let body = resp.text().await?;
  if !status.is_success() {
    error!(%status, "secret store request failed");
    return Err(Error::Authentication { status, body });
  }
  Ok(body)
}
