//! Checkout, billing portal and payment-provider webhook handlers.
//!
//! ```text
//! POST /api/v1/checkout
//! POST /api/v1/billing-portal
//! POST /api/v1/webhooks/stripe      (signed, no session)
//! ```
//!
//! Checkout and the portal need a signed-in user but no active
//! subscription, so lapsed users can resubscribe.

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::state::HttpState;

/// Header carrying the payment provider's webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Plan selection submitted from the pricing page.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[schema(example = "principal")]
    pub plan_id: Option<String>,
    #[schema(example = "annual")]
    pub billing_interval: Option<String>,
}

/// Hosted page to redirect the browser to.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedirectUrlResponse {
    pub url: String,
}

/// Start a hosted checkout with a fourteen-day trial.
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = RedirectUrlResponse),
        (status = 400, description = "Invalid plan or interval", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Onboarding required", body = Error)
    ),
    tags = ["billing"],
    operation_id = "createCheckoutSession"
)]
#[post("/checkout")]
pub async fn checkout(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    payload: web::Json<CheckoutRequest>,
) -> ApiResult<web::Json<RedirectUrlResponse>> {
    let CheckoutRequest {
        plan_id,
        billing_interval,
    } = payload.into_inner();
    let url = state
        .billing
        .checkout(
            &caller.user,
            plan_id.as_deref().unwrap_or_default(),
            billing_interval.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(web::Json(RedirectUrlResponse { url }))
}

/// Open the self-service billing portal.
#[utoipa::path(
    post,
    path = "/api/v1/billing-portal",
    responses(
        (status = 200, description = "Portal session created", body = RedirectUrlResponse),
        (status = 400, description = "No billing account", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["billing"],
    operation_id = "createBillingPortalSession"
)]
#[post("/billing-portal")]
pub async fn billing_portal(
    state: web::Data<HttpState>,
    caller: CurrentUser,
) -> ApiResult<web::Json<RedirectUrlResponse>> {
    let url = state.billing.billing_portal(&caller.user).await?;
    Ok(web::Json(RedirectUrlResponse { url }))
}

/// Receive a signed payment-provider event.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/stripe",
    request_body(content = String, content_type = "application/json", description = "Raw signed webhook payload"),
    params(
        ("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac>")
    ),
    responses(
        (status = 200, description = "Event received"),
        (status = 400, description = "Missing or invalid signature", body = Error)
    ),
    tags = ["billing"],
    security([]),
    operation_id = "stripeWebhook"
)]
#[post("/webhooks/stripe")]
pub async fn stripe_webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = request
        .headers()
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let outcome = state.billing.handle_webhook(&body, signature).await?;
    debug!(?outcome, "payments webhook handled");
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}
