//! Plaid outbound adapters.
//!
//! [`PlaidHttpClient`] implements the `BankDataSource` port and
//! [`PlaidJwtWebhookVerifier`] implements `PlaidWebhookVerifier`. Both share
//! one [`PlaidCredentials`] value.

mod dto;
mod http_client;
mod webhook_verifier;

use std::str::FromStr;

pub use http_client::PlaidHttpClient;
pub use webhook_verifier::PlaidJwtWebhookVerifier;

/// Plaid deployment the credentials belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaidEnvironment {
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Development => "https://development.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!("unknown Plaid environment: {other}")),
        }
    }
}

/// API credentials and link settings.
#[derive(Debug, Clone)]
pub struct PlaidCredentials {
    pub client_id: String,
    pub secret: String,
    pub environment: PlaidEnvironment,
    /// Webhook URL registered on new link tokens.
    pub webhook_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sandbox", PlaidEnvironment::Sandbox)]
    #[case("Development", PlaidEnvironment::Development)]
    #[case(" production ", PlaidEnvironment::Production)]
    fn parses_environment_names(#[case] raw: &str, #[case] expected: PlaidEnvironment) {
        assert_eq!(raw.parse::<PlaidEnvironment>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_environment() {
        assert!("staging".parse::<PlaidEnvironment>().is_err());
    }
}
