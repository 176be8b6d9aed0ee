//! Request and response bodies for the Plaid REST API.

use serde::{Deserialize, Serialize};

use crate::domain::UpstreamAccount;

#[derive(Debug, Serialize)]
pub(super) struct LinkTokenUser<'a> {
    pub(super) client_user_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct LinkTokenCreateRequest<'a> {
    pub(super) client_name: &'a str,
    pub(super) user: LinkTokenUser<'a>,
    pub(super) products: &'a [&'a str],
    pub(super) country_codes: &'a [&'a str],
    pub(super) language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) webhook: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LinkTokenCreateResponse {
    pub(super) link_token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PublicTokenExchangeRequest<'a> {
    pub(super) public_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct PublicTokenExchangeResponse {
    pub(super) access_token: String,
    pub(super) item_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AccountsGetRequest<'a> {
    pub(super) access_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountsGetResponse {
    #[serde(default)]
    pub(super) accounts: Vec<UpstreamAccount>,
}

#[derive(Debug, Serialize)]
pub(super) struct VerificationKeyRequest<'a> {
    pub(super) key_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct VerificationKeyResponse {
    pub(super) key: jsonwebtoken::jwk::Jwk,
}

/// Error envelope Plaid returns with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(super) struct PlaidErrorBody {
    pub(super) error_code: String,
    #[serde(default)]
    pub(super) error_message: String,
}
