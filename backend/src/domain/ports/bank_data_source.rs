//! Port for the bank-data aggregator API.

use async_trait::async_trait;

use crate::domain::{UpstreamAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by aggregator clients.
    pub enum BankDataError {
        /// The aggregator could not be reached.
        Transport { message: String } => "bank data request failed: {message}",
        /// The aggregator answered with an error payload.
        Upstream { code: String, message: String } => "bank data error {code}: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "bank data response malformed: {message}",
    }
}

impl BankDataError {
    /// Provider error code to record against an item.
    pub fn item_error_code(&self) -> Option<&str> {
        match self {
            Self::Upstream { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Credentials returned by a public-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangedItem {
    pub access_token: String,
    pub item_id: String,
}

/// Aggregator operations used by the sync workflow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankDataSource: Send + Sync {
    /// Short-lived token that opens the client-side link flow.
    async fn create_link_token(&self, user_id: &UserId) -> Result<String, BankDataError>;

    /// Trade a link public token for a long-lived access token.
    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<ExchangedItem, BankDataError>;

    /// Current accounts and balances for an item.
    async fn fetch_accounts(&self, access_token: &str)
    -> Result<Vec<UpstreamAccount>, BankDataError>;
}

/// Fixture implementation for deployments without aggregator credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBankDataSource;

#[async_trait]
impl BankDataSource for FixtureBankDataSource {
    async fn create_link_token(&self, _user_id: &UserId) -> Result<String, BankDataError> {
        Err(BankDataError::transport("bank data provider not configured"))
    }

    async fn exchange_public_token(
        &self,
        _public_token: &str,
    ) -> Result<ExchangedItem, BankDataError> {
        Err(BankDataError::transport("bank data provider not configured"))
    }

    async fn fetch_accounts(
        &self,
        _access_token: &str,
    ) -> Result<Vec<UpstreamAccount>, BankDataError> {
        Ok(Vec::new())
    }
}
