//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.
//!
//! Handlers stay thin: an extractor from [`auth`] applies the access gate,
//! the body is validated into domain input, and a service on
//! [`state::HttpState`] does the work.

pub mod account;
pub mod assets;
pub mod auth;
pub mod billing;
pub mod cron;
pub mod documents;
pub mod entities;
pub mod error;
pub mod health;
pub mod insights;
pub mod plaid;
pub mod portfolio;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// `DELETE /assets/seed` is registered ahead of `DELETE /assets/{id}` so the
/// literal segment wins.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(assets::list_assets)
        .service(assets::create_asset)
        .service(assets::update_asset)
        .service(assets::clear_seed_assets)
        .service(assets::delete_asset)
        .service(entities::list_entities)
        .service(entities::create_entity)
        .service(entities::delete_entity)
        .service(documents::list_documents)
        .service(documents::upload_document)
        .service(documents::delete_document)
        .service(insights::list_insights)
        .service(insights::generate_insights)
        .service(portfolio::portfolio_summary)
        .service(plaid::create_link_token)
        .service(plaid::exchange_token)
        .service(plaid::sync_items)
        .service(plaid::plaid_webhook)
        .service(billing::checkout)
        .service(billing::billing_portal)
        .service(billing::stripe_webhook)
        .service(account::complete_onboarding)
        .service(account::notification_settings)
        .service(account::update_notification_settings)
        .service(cron::cron_plaid_sync)
        .service(cron::cron_generate_insights);
}
