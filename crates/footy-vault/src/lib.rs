//! Credential client for the cloud secret store.
//!
//! Exchanges a client id/secret pair for a bearer token (OAuth2 client
//! credentials), caches the token in memory for the life of the
//! [`VaultClient`], and reads application secrets with it.
//!
//! ```rust,ignore
//! let mut vault = VaultClient::new(VaultConfig::new(client_id, client_secret))?;
//! let api_key = vault.fetch_secret(&SecretPath::new(org, project, app)).await?;
//! ```

mod client;
mod token;

pub mod error;

pub use client::{SecretPath, VaultClient, VaultConfig};
pub use error::{Error, Result};
pub use token::AccessToken;

/// OAuth2 token endpoint of the identity provider.
pub const DEFAULT_TOKEN_URL: &str = "https://auth.idp.hashicorp.com/oauth2/token";

/// Base URL of the secrets API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloud.hashicorp.com";

/// Audience requested for issued tokens.
pub const DEFAULT_AUDIENCE: &str = "https://api.hashicorp.cloud";

/// Secrets API version segment used in read paths.
pub const SECRETS_API_VERSION: &str = "2023-06-13";
