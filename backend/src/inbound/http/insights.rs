//! Insight HTTP handlers.
//!
//! ```text
//! GET  /api/v1/insights
//! POST /api/v1/insights/generate
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, Insight, NewInsight};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Subscriber;
use crate::inbound::http::state::HttpState;

/// Stored insight.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    #[schema(example = "rebalance")]
    pub category: String,
    #[schema(example = "high")]
    pub priority: String,
    pub actionable: bool,
    pub dismissed: bool,
    pub created_at: String,
}

impl From<Insight> for InsightResponse {
    fn from(insight: Insight) -> Self {
        Self {
            id: insight.id.to_string(),
            title: insight.title,
            description: insight.description,
            category: insight.category.as_str().to_owned(),
            priority: insight.priority.as_str().to_owned(),
            actionable: insight.actionable,
            dismissed: insight.dismissed,
            created_at: insight.created_at.to_rfc3339(),
        }
    }
}

/// Freshly generated insight content.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedInsight {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub actionable: bool,
}

impl From<NewInsight> for GeneratedInsight {
    fn from(insight: NewInsight) -> Self {
        Self {
            title: insight.title,
            description: insight.description,
            category: insight.category.as_str().to_owned(),
            priority: insight.priority.as_str().to_owned(),
            actionable: insight.actionable,
        }
    }
}

/// Result of an on-demand generation.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateInsightsResponse {
    pub insights: Vec<GeneratedInsight>,
    pub count: usize,
}

/// List the subscriber's insights, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/insights",
    responses(
        (status = 200, description = "Insights", body = [InsightResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["insights"],
    operation_id = "listInsights"
)]
#[get("/insights")]
pub async fn list_insights(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<Vec<InsightResponse>>> {
    let insights = state.insights.list(&subscriber.user().id).await?;
    Ok(web::Json(
        insights.into_iter().map(InsightResponse::from).collect(),
    ))
}

/// Ask the model for fresh insights about the subscriber's portfolio.
///
/// Insights older than the retention window are purged first.
#[utoipa::path(
    post,
    path = "/api/v1/insights/generate",
    responses(
        (status = 200, description = "Generated insights", body = GenerateInsightsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error),
        (status = 500, description = "Failed to generate insights", body = Error),
        (status = 503, description = "Model unavailable", body = Error)
    ),
    tags = ["insights"],
    operation_id = "generateInsights"
)]
#[post("/insights/generate")]
pub async fn generate_insights(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<GenerateInsightsResponse>> {
    let generated = state.insights.generate(&subscriber.user().id).await?;
    let insights: Vec<GeneratedInsight> =
        generated.into_iter().map(GeneratedInsight::from).collect();
    Ok(web::Json(GenerateInsightsResponse {
        count: insights.len(),
        insights,
    }))
}
