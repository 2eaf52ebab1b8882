//! Runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `FOOTY_*` environment variables (`__` separates nested keys, e.g.
//! `FOOTY_VAULT__CLIENT_ID`), then the legacy `VLT_*` / `HCP_*` variables.
//! Command-line flags are applied on top by the binary.

use std::{fmt, path::{Path, PathBuf}};

use footy_collector::CollectorConfig;
use footy_vault::{SecretPath, VaultConfig};
use serde::Deserialize;

use crate::{Error, Result};

/// Legacy variable names and the keys they populate.
const LEGACY_ENV: &[(&str, &str)] = &[
  ("VLT_ORG_ID", "vault.organization_id"),
  ("VLT_PROJECT_ID", "vault.project_id"),
  ("VLT_APP", "vault.app_name"),
  ("HCP_CLIENT_ID", "vault.client_id"),
  ("HCP_CLIENT_SECRET", "vault.client_secret"),
];

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  pub vault:      VaultSettings,
  pub football:   FootballSettings,
  pub store_path: PathBuf,
  pub table:      String,
  pub country:    String,
}

/// Secret store credentials and the location of the API key secret.
#[derive(Clone, Deserialize)]
pub struct VaultSettings {
  #[serde(default)]
  pub organization_id: String,
  #[serde(default)]
  pub project_id:      String,
  #[serde(default)]
  pub app_name:        String,
  #[serde(default)]
  pub client_id:       String,
  #[serde(default)]
  pub client_secret:   String,
  pub token_url:       String,
  pub api_base_url:    String,
  pub audience:        String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FootballSettings {
  pub base_url: String,
}

impl VaultSettings {
  pub fn vault_config(&self) -> VaultConfig {
    VaultConfig {
      token_url: self.token_url.clone(),
      api_base_url: self.api_base_url.clone(),
      audience: self.audience.clone(),
      ..VaultConfig::new(self.client_id.clone(), self.client_secret.clone())
    }
  }

  pub fn secret_path(&self) -> SecretPath {
    SecretPath::new(
      self.organization_id.clone(),
      self.project_id.clone(),
      self.app_name.clone(),
    )
  }
}

impl fmt::Debug for VaultSettings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VaultSettings")
      .field("organization_id", &self.organization_id)
      .field("project_id", &self.project_id)
      .field("app_name", &self.app_name)
      .field("client_id", &self.client_id)
      .field("client_secret", &"<redacted>")
      .field("token_url", &self.token_url)
      .field("api_base_url", &self.api_base_url)
      .field("audience", &self.audience)
      .finish()
  }
}

impl FootballSettings {
  pub fn collector_config(&self) -> CollectorConfig {
    CollectorConfig { base_url: self.base_url.clone(), ..Default::default() }
  }
}

impl IngestConfig {
  /// Fail with every required setting that is missing or empty.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("vault.organization_id", &self.vault.organization_id),
      ("vault.project_id", &self.vault.project_id),
      ("vault.app_name", &self.vault.app_name),
      ("vault.client_id", &self.vault.client_id),
      ("vault.client_secret", &self.vault.client_secret),
      ("table", &self.table),
      ("country", &self.country),
    ];

    let missing: Vec<&str> = required
      .iter()
      .filter(|(_, value)| value.trim().is_empty())
      .map(|(key, _)| *key)
      .collect();

    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::Config(format!(
        "missing required settings: {}",
        missing.join(", ")
      )))
    }
  }
}

// ─── Loading ──────────────────────────────────────────────────────────────────

/// Load configuration from `path` (if it exists) and the process environment.
pub fn load(path: Option<&Path>) -> Result<IngestConfig> {
  load_with_env(path, std::env::vars().collect())
}

/// Like [`load`], reading variables from `env` instead of the process.
pub fn load_with_env(
  path: Option<&Path>,
  env: config::Map<String, String>,
) -> Result<IngestConfig> {
  let mut builder = config::Config::builder()
    .set_default("vault.token_url", footy_vault::DEFAULT_TOKEN_URL)?
    .set_default("vault.api_base_url", footy_vault::DEFAULT_API_BASE_URL)?
    .set_default("vault.audience", footy_vault::DEFAULT_AUDIENCE)?
    .set_default("football.base_url", footy_collector::DEFAULT_BASE_URL)?
    .set_default("store_path", "temp/footy.sqlite3")?
    .set_default("table", "leagues")?
    .set_default("country", "Brazil")?;

  if let Some(path) = path {
    builder = builder.add_source(config::File::from(path).required(false));
  }

  builder = builder.add_source(
    config::Environment::with_prefix("FOOTY")
      .prefix_separator("_")
      .separator("__")
      .source(Some(env.clone())),
  );

  for (var, key) in LEGACY_ENV {
    builder = builder.set_override_option(*key, env.get(*var).cloned())?;
  }

  let settings: IngestConfig = builder.build()?.try_deserialize()?;
  settings.validate()?;
  Ok(settings)
}
