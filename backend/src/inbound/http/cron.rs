//! Scheduler-triggered batch jobs.
//!
//! Both jobs answer GET as well as POST since hosted schedulers differ in
//! the verb they send. Callers authenticate with the cron bearer secret.

use actix_web::{route, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, GenerationReport, SyncReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CronCaller;
use crate::inbound::http::state::HttpState;

/// Totals for a bank sync batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct CronSyncResponse {
    pub synced: usize,
    pub failed: usize,
    pub total: usize,
}

impl From<SyncReport> for CronSyncResponse {
    fn from(value: SyncReport) -> Self {
        Self {
            synced: value.synced,
            failed: value.failed,
            total: value.total,
        }
    }
}

/// Totals for an insight generation batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct CronGenerationResponse {
    pub generated: usize,
    pub failed: usize,
    pub total: usize,
}

impl From<GenerationReport> for CronGenerationResponse {
    fn from(value: GenerationReport) -> Self {
        Self {
            generated: value.generated,
            failed: value.failed,
            total: value.total,
        }
    }
}

/// Refresh every active bank link.
#[utoipa::path(
    post,
    path = "/api/v1/cron/plaid-sync",
    responses(
        (status = 200, description = "Batch finished", body = CronSyncResponse),
        (status = 401, description = "Missing or wrong cron secret", body = Error)
    ),
    tags = ["cron"],
    security(("CronSecret" = [])),
    operation_id = "cronPlaidSync"
)]
#[route("/cron/plaid-sync", method = "GET", method = "POST")]
pub async fn cron_plaid_sync(
    state: web::Data<HttpState>,
    _caller: CronCaller,
) -> ApiResult<web::Json<CronSyncResponse>> {
    let report = state.plaid.sync_all_active().await?;
    info!(synced = report.synced, failed = report.failed, "cron plaid sync finished");
    Ok(web::Json(report.into()))
}

/// Generate fresh insights for every entitled subscriber.
#[utoipa::path(
    post,
    path = "/api/v1/cron/generate-insights",
    responses(
        (status = 200, description = "Batch finished", body = CronGenerationResponse),
        (status = 401, description = "Missing or wrong cron secret", body = Error)
    ),
    tags = ["cron"],
    security(("CronSecret" = [])),
    operation_id = "cronGenerateInsights"
)]
#[route("/cron/generate-insights", method = "GET", method = "POST")]
pub async fn cron_generate_insights(
    state: web::Data<HttpState>,
    _caller: CronCaller,
) -> ApiResult<web::Json<CronGenerationResponse>> {
    let report = state.insights.generate_for_subscribers().await?;
    info!(
        generated = report.generated,
        failed = report.failed,
        "cron insight generation finished"
    );
    Ok(web::Json(report.into()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::SubscriptionStatus;
    use crate::domain::ports::AssetRepository;
    use crate::domain::{AssetCategory, Cents, NewAsset};
    use crate::inbound::http::test_utils::{CRON_SECRET, TestPorts, send};

    fn cron(req: actix_test::TestRequest, token: &str) -> actix_test::TestRequest {
        req.insert_header((AUTHORIZATION, format!("Bearer {token}")))
    }

    #[rstest]
    #[case("/api/v1/cron/plaid-sync")]
    #[case("/api/v1/cron/generate-insights")]
    #[actix_web::test]
    async fn wrong_secret_is_unauthorised(#[case] uri: &str) {
        let ports = TestPorts::default();
        let (status, body) = send(
            ports.state(),
            cron(actix_test::TestRequest::post().uri(uri), "guess"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[rstest]
    #[case(actix_test::TestRequest::get())]
    #[case(actix_test::TestRequest::post())]
    #[actix_web::test]
    async fn plaid_sync_accepts_both_verbs(#[case] req: actix_test::TestRequest) {
        let ports = TestPorts::default();
        let (status, body) = send(
            ports.state(),
            cron(req.uri("/api/v1/cron/plaid-sync"), CRON_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "synced": 0, "failed": 0, "total": 0 }));
    }

    #[actix_web::test]
    async fn insight_batch_covers_entitled_subscribers_only() {
        let ports = TestPorts::default();
        let active = ports.subscriber("user_active", SubscriptionStatus::Active).await;
        let trialing = ports
            .subscriber("user_trialing", SubscriptionStatus::Trialing)
            .await;
        ports
            .subscriber("user_canceled", SubscriptionStatus::Canceled)
            .await;
        for user in [&active, &trialing] {
            ports
                .assets
                .insert(&NewAsset::manual(
                    user.id,
                    "Brokerage".to_owned(),
                    AssetCategory::Equities,
                    Cents::new(1_000_000),
                ))
                .await
                .expect("asset inserted");
        }

        let (status, body) = send(
            ports.state(),
            cron(
                actix_test::TestRequest::post().uri("/api/v1/cron/generate-insights"),
                CRON_SECRET,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "generated": 2, "failed": 0, "total": 2 }));
    }
}
