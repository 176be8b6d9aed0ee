//! Bank-link HTTP handlers.
//!
//! ```text
//! POST /api/v1/plaid/link-token
//! POST /api/v1/plaid/exchange-token
//! POST /api/v1/plaid/sync
//! POST /api/v1/plaid/webhook        (signed, no session)
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::ports::WebhookVerificationError;
use crate::domain::{Error, LinkedInstitution, PlaidWebhook, SyncReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Subscriber;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::missing_field_error;

/// Header carrying the aggregator's signed webhook JWT.
pub const PLAID_VERIFICATION_HEADER: &str = "Plaid-Verification";

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkTokenResponse {
    pub link_token: String,
}

/// Public token returned by the client-side link flow.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeTokenRequest {
    pub public_token: Option<String>,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeTokenResponse {
    pub success: bool,
    pub item_id: String,
}

/// Counts for a sync batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncReportResponse {
    pub success: bool,
    pub synced: usize,
    pub failed: usize,
    pub total: usize,
}

impl From<SyncReport> for SyncReportResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            success: true,
            synced: report.synced,
            failed: report.failed,
            total: report.total,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Create a link token for the client-side link flow.
#[utoipa::path(
    post,
    path = "/api/v1/plaid/link-token",
    responses(
        (status = 200, description = "Link token", body = LinkTokenResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error),
        (status = 503, description = "Bank data provider unavailable", body = Error)
    ),
    tags = ["plaid"],
    operation_id = "createLinkToken"
)]
#[post("/plaid/link-token")]
pub async fn create_link_token(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<LinkTokenResponse>> {
    let link_token = state.plaid.create_link_token(&subscriber.user().id).await?;
    Ok(web::Json(LinkTokenResponse { link_token }))
}

/// Exchange a public token, store the item and run its first sync.
#[utoipa::path(
    post,
    path = "/api/v1/plaid/exchange-token",
    request_body = ExchangeTokenRequest,
    responses(
        (status = 200, description = "Item linked", body = ExchangeTokenResponse),
        (status = 400, description = "Public token missing", body = Error),
        (status = 403, description = "Subscription required", body = Error),
        (status = 503, description = "Bank data provider unavailable", body = Error)
    ),
    tags = ["plaid"],
    operation_id = "exchangePublicToken"
)]
#[post("/plaid/exchange-token")]
pub async fn exchange_token(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    payload: web::Json<ExchangeTokenRequest>,
) -> ApiResult<web::Json<ExchangeTokenResponse>> {
    let ExchangeTokenRequest {
        public_token,
        institution_id,
        institution_name,
    } = payload.into_inner();
    let public_token = non_blank(public_token)
        .ok_or_else(|| missing_field_error("Public token is required", "publicToken"))?;
    let institution = LinkedInstitution {
        id: non_blank(institution_id),
        name: non_blank(institution_name),
    };
    let item = state
        .plaid
        .link_item(&subscriber.user().id, &public_token, institution)
        .await?;
    Ok(web::Json(ExchangeTokenResponse {
        success: true,
        item_id: item.id.to_string(),
    }))
}

/// Resync every active item of the subscriber.
#[utoipa::path(
    post,
    path = "/api/v1/plaid/sync",
    responses(
        (status = 200, description = "Sync finished", body = SyncReportResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["plaid"],
    operation_id = "syncPlaidItems"
)]
#[post("/plaid/sync")]
pub async fn sync_items(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<SyncReportResponse>> {
    let report = state.plaid.sync_user_items(&subscriber.user().id).await?;
    Ok(web::Json(SyncReportResponse::from(report)))
}

fn verification_error(err: WebhookVerificationError) -> Error {
    match err {
        WebhookVerificationError::KeyUnavailable { message } => {
            Error::service_unavailable(format!("webhook verification key unavailable: {message}"))
        }
        other => {
            debug!(error = %other, "rejected bank webhook");
            Error::unauthorized("Invalid webhook signature")
        }
    }
}

/// Receive an aggregator webhook.
///
/// The body is only parsed after its signature checks out. Processing
/// failures are logged and still acknowledged.
#[utoipa::path(
    post,
    path = "/api/v1/plaid/webhook",
    request_body(content = String, content_type = "application/json", description = "Raw signed webhook payload"),
    params(
        ("Plaid-Verification" = String, Header, description = "Signed ES256 JWT covering the body hash")
    ),
    responses(
        (status = 200, description = "Webhook received"),
        (status = 400, description = "Body is not a webhook", body = Error),
        (status = 401, description = "Signature missing or invalid", body = Error),
        (status = 503, description = "Verification key unavailable", body = Error)
    ),
    tags = ["plaid"],
    security([]),
    operation_id = "plaidWebhook"
)]
#[post("/plaid/webhook")]
pub async fn plaid_webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let header = request
        .headers()
        .get(PLAID_VERIFICATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| verification_error(WebhookVerificationError::missing_signature()))?;
    state
        .plaid_webhooks
        .verify(header, &body)
        .await
        .map_err(verification_error)?;

    let webhook: PlaidWebhook = serde_json::from_slice(&body)
        .map_err(|_| Error::invalid_request("Malformed webhook body"))?;
    match state.plaid.handle_webhook(&webhook).await {
        Ok(outcome) => debug!(
            webhook_type = %webhook.webhook_type,
            webhook_code = %webhook.webhook_code,
            ?outcome,
            "bank webhook handled"
        ),
        Err(err) => warn!(
            webhook_type = %webhook.webhook_type,
            error = %err,
            "bank webhook processing failed"
        ),
    }
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

#[cfg(test)]
#[path = "plaid_tests.rs"]
mod tests;
