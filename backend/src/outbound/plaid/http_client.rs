//! Reqwest-backed Plaid client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::PlaidCredentials;
use super::dto::{
    AccountsGetRequest, AccountsGetResponse, LinkTokenCreateRequest, LinkTokenCreateResponse,
    LinkTokenUser, PlaidErrorBody, PublicTokenExchangeRequest, PublicTokenExchangeResponse,
};
use crate::domain::UpstreamAccount;
use crate::domain::UserId;
use crate::domain::ports::{BankDataError, BankDataSource, ExchangedItem};
use crate::outbound::http_body::body_preview;

const CLIENT_NAME: &str = "Patrimony";
const LINK_PRODUCTS: &[&str] = &["auth", "transactions"];
const LINK_COUNTRY_CODES: &[&str] = &["US"];
const LINK_LANGUAGE: &str = "en";

/// Plaid API client authenticating with the client id and secret headers.
#[derive(Clone)]
pub struct PlaidHttpClient {
    client: Client,
    base_url: String,
    credentials: PlaidCredentials,
}

impl PlaidHttpClient {
    /// Build a client for the credentials' environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(credentials: PlaidCredentials, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base_url = credentials.environment.base_url().to_owned();
        Self::with_base_url(credentials, base_url, timeout)
    }

    /// Build a client against an explicit base URL.
    pub fn with_base_url(
        credentials: PlaidCredentials,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    pub(super) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, BankDataError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "plaid request");
        let response = self
            .client
            .post(url)
            .header("PLAID-CLIENT-ID", self.credentials.client_id.as_str())
            .header("PLAID-SECRET", self.credentials.secret.as_str())
            .json(body)
            .send()
            .await
            .map_err(|err| BankDataError::transport(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| BankDataError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_error_body(status.as_u16(), &bytes));
        }
        serde_json::from_slice(&bytes).map_err(|err| BankDataError::decode(err.to_string()))
    }
}

fn map_error_body(status: u16, body: &[u8]) -> BankDataError {
    match serde_json::from_slice::<PlaidErrorBody>(body) {
        Ok(error) => BankDataError::upstream(error.error_code, error.error_message),
        Err(_) => BankDataError::transport(format!("status {status}: {}", body_preview(body))),
    }
}

#[async_trait]
impl BankDataSource for PlaidHttpClient {
    async fn create_link_token(&self, user_id: &UserId) -> Result<String, BankDataError> {
        let client_user_id = user_id.to_string();
        let request = LinkTokenCreateRequest {
            client_name: CLIENT_NAME,
            user: LinkTokenUser {
                client_user_id: &client_user_id,
            },
            products: LINK_PRODUCTS,
            country_codes: LINK_COUNTRY_CODES,
            language: LINK_LANGUAGE,
            webhook: self.credentials.webhook_url.as_deref(),
        };
        let response: LinkTokenCreateResponse = self.post("/link/token/create", &request).await?;
        Ok(response.link_token)
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<ExchangedItem, BankDataError> {
        let response: PublicTokenExchangeResponse = self
            .post(
                "/item/public_token/exchange",
                &PublicTokenExchangeRequest { public_token },
            )
            .await?;
        Ok(ExchangedItem {
            access_token: response.access_token,
            item_id: response.item_id,
        })
    }

    async fn fetch_accounts(
        &self,
        access_token: &str,
    ) -> Result<Vec<UpstreamAccount>, BankDataError> {
        let response: AccountsGetResponse = self
            .post("/accounts/get", &AccountsGetRequest { access_token })
            .await?;
        Ok(response.accounts)
    }
}
