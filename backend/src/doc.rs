//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every handler in the inbound HTTP layer. Request and
//! response schemas are collected from the handlers' annotations; the error
//! payload is registered explicitly. Two bearer schemes are declared: the
//! identity provider's session token (default for every operation) and the
//! cron secret.
//!
//! Served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};

/// Register the bearer security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let session = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some(
                "Identity provider session token; the `__session` cookie is also accepted.",
            ))
            .build();
        components.add_security_scheme("SessionToken", SecurityScheme::Http(session));

        let cron = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .description(Some("Shared secret configured for the scheduler."))
            .build();
        components.add_security_scheme("CronSecret", SecurityScheme::Http(cron));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Patrimony API",
        description = "Subscription-gated wealth management: assets, entities, documents, bank sync, insights and billing."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionToken" = [])),
    paths(
        crate::inbound::http::assets::list_assets,
        crate::inbound::http::assets::create_asset,
        crate::inbound::http::assets::update_asset,
        crate::inbound::http::assets::clear_seed_assets,
        crate::inbound::http::assets::delete_asset,
        crate::inbound::http::entities::list_entities,
        crate::inbound::http::entities::create_entity,
        crate::inbound::http::entities::delete_entity,
        crate::inbound::http::documents::list_documents,
        crate::inbound::http::documents::upload_document,
        crate::inbound::http::documents::delete_document,
        crate::inbound::http::insights::list_insights,
        crate::inbound::http::insights::generate_insights,
        crate::inbound::http::portfolio::portfolio_summary,
        crate::inbound::http::plaid::create_link_token,
        crate::inbound::http::plaid::exchange_token,
        crate::inbound::http::plaid::sync_items,
        crate::inbound::http::plaid::plaid_webhook,
        crate::inbound::http::billing::checkout,
        crate::inbound::http::billing::billing_portal,
        crate::inbound::http::billing::stripe_webhook,
        crate::inbound::http::account::complete_onboarding,
        crate::inbound::http::account::notification_settings,
        crate::inbound::http::account::update_notification_settings,
        crate::inbound::http::cron::cron_plaid_sync,
        crate::inbound::http::cron::cron_generate_insights,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "assets", description = "Tracked holdings"),
        (name = "entities", description = "Trusts, companies and other legal structures"),
        (name = "documents", description = "Uploaded estate documents"),
        (name = "insights", description = "Generated portfolio recommendations"),
        (name = "portfolio", description = "Net worth and allocation"),
        (name = "plaid", description = "Bank linking and balance sync"),
        (name = "billing", description = "Checkout, billing portal and payment webhooks"),
        (name = "account", description = "Onboarding and notification settings"),
        (name = "cron", description = "Scheduler-triggered batch jobs"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
