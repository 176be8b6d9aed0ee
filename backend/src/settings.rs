//! Application configuration loaded via OrthoConfig.
//!
//! Values come from `PATRIMONY_*` environment variables, CLI flags or a
//! config file. Vendor credentials are optional: a missing credential makes
//! the server fall back to the matching fixture adapter, and a missing
//! database URL selects in-memory fixture repositories.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_PLAID_ENV: &str = "sandbox";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Server, database and vendor settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PATRIMONY")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Public base URL of the web app, used for billing redirects.
    #[ortho_config(default = String::from(DEFAULT_APP_URL))]
    pub app_url: Option<String>,
    /// Bearer secret expected by the cron endpoints.
    pub cron_secret: Option<String>,
    /// PEM file holding the identity provider's RSA public key.
    pub identity_public_key_path: Option<PathBuf>,
    /// Timeout applied to every outbound vendor request.
    #[ortho_config(default = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: Option<u64>,

    pub plaid_client_id: Option<String>,
    pub plaid_secret: Option<String>,
    /// `sandbox`, `development` or `production`.
    #[ortho_config(default = String::from(DEFAULT_PLAID_ENV))]
    pub plaid_env: Option<String>,
    pub plaid_webhook_url: Option<String>,
    /// 64 hex characters for sealing Plaid access tokens.
    pub plaid_encryption_key: Option<String>,

    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub anthropic_model: Option<String>,
    pub anthropic_max_tokens: Option<u32>,

    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_base_url: Option<String>,

    pub blob_base_url: Option<String>,
    pub blob_token: Option<String>,
}

/// Configured value that does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid app URL {value}: {message}")]
    AppUrl { value: String, message: String },
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl AppSettings {
    /// Parsed bind address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_empty(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        non_empty(self.database_url.as_ref())
    }

    /// Public base URL of the web app, defaulting to the local dev server.
    pub fn app_url(&self) -> Result<Url, SettingsError> {
        let raw = non_empty(self.app_url.as_ref()).unwrap_or(DEFAULT_APP_URL);
        Url::parse(raw).map_err(|err| SettingsError::AppUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn cron_secret(&self) -> Option<&str> {
        non_empty(self.cron_secret.as_ref())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn plaid_env(&self) -> &str {
        non_empty(self.plaid_env.as_ref()).unwrap_or(DEFAULT_PLAID_ENV)
    }

    /// Client id and secret when both are configured.
    pub fn plaid_credentials(&self) -> Option<(&str, &str)> {
        Some((
            non_empty(self.plaid_client_id.as_ref())?,
            non_empty(self.plaid_secret.as_ref())?,
        ))
    }

    pub fn plaid_webhook_url(&self) -> Option<&str> {
        non_empty(self.plaid_webhook_url.as_ref())
    }

    pub fn plaid_encryption_key(&self) -> Option<&str> {
        non_empty(self.plaid_encryption_key.as_ref())
    }

    pub fn anthropic_api_key(&self) -> Option<&str> {
        non_empty(self.anthropic_api_key.as_ref())
    }

    /// Secret key and webhook secret when both are configured.
    pub fn stripe_credentials(&self) -> Option<(&str, &str)> {
        Some((
            non_empty(self.stripe_secret_key.as_ref())?,
            non_empty(self.stripe_webhook_secret.as_ref())?,
        ))
    }

    /// Base URL and token when both are configured.
    pub fn blob_store(&self) -> Option<(&str, &str)> {
        Some((
            non_empty(self.blob_base_url.as_ref())?,
            non_empty(self.blob_token.as_ref())?,
        ))
    }
}
