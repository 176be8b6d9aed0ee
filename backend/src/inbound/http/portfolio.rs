//! Portfolio summary handler.
//!
//! ```text
//! GET /api/v1/portfolio/summary
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AllocationSlice, EntityRollup, Error, Holding, PortfolioContext};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Subscriber;
use crate::inbound::http::state::HttpState;

/// One category's share of net worth.
#[derive(Debug, Serialize, ToSchema)]
pub struct AllocationResponse {
    pub category: String,
    pub label: String,
    /// Dollars.
    pub total: f64,
    pub percentage: f64,
    pub count: usize,
}

impl From<AllocationSlice> for AllocationResponse {
    fn from(slice: AllocationSlice) -> Self {
        Self {
            category: slice.category.as_str().to_owned(),
            label: slice.category.label().to_owned(),
            total: slice.total.to_dollars(),
            percentage: slice.percentage,
            count: slice.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoldingResponse {
    pub name: String,
    pub value: f64,
    pub category: String,
    pub entity_name: Option<String>,
}

impl From<Holding> for HoldingResponse {
    fn from(holding: Holding) -> Self {
        Self {
            name: holding.name,
            value: holding.value.to_dollars(),
            category: holding.category.as_str().to_owned(),
            entity_name: holding.entity_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityRollupResponse {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub asset_count: usize,
    pub total_value: f64,
}

impl From<EntityRollup> for EntityRollupResponse {
    fn from(rollup: EntityRollup) -> Self {
        Self {
            name: rollup.name,
            kind: rollup.kind.as_str().to_owned(),
            asset_count: rollup.asset_count,
            total_value: rollup.total_value.to_dollars(),
        }
    }
}

/// Net worth and allocation for the signed-in subscriber.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummaryResponse {
    /// Dollars.
    pub net_worth: f64,
    pub asset_count: usize,
    pub entity_count: usize,
    pub allocation: Vec<AllocationResponse>,
    pub top_holdings: Vec<HoldingResponse>,
    pub entities: Vec<EntityRollupResponse>,
}

impl From<PortfolioContext> for PortfolioSummaryResponse {
    fn from(context: PortfolioContext) -> Self {
        Self {
            net_worth: context.net_worth.to_dollars(),
            asset_count: context.asset_count,
            entity_count: context.entity_count,
            allocation: context.allocation.into_iter().map(Into::into).collect(),
            top_holdings: context.top_holdings.into_iter().map(Into::into).collect(),
            entities: context.entities.into_iter().map(Into::into).collect(),
        }
    }
}

/// Summarise the subscriber's portfolio.
#[utoipa::path(
    get,
    path = "/api/v1/portfolio/summary",
    responses(
        (status = 200, description = "Portfolio summary", body = PortfolioSummaryResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["portfolio"],
    operation_id = "getPortfolioSummary"
)]
#[get("/portfolio/summary")]
pub async fn portfolio_summary(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<PortfolioSummaryResponse>> {
    let context = state.portfolio.context(&subscriber.user().id).await?;
    Ok(web::Json(PortfolioSummaryResponse::from(context)))
}
