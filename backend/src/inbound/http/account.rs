//! Onboarding and notification settings.
//!
//! These endpoints sit below the subscription gate: onboarding runs before a
//! user row exists, and settings stay reachable after a subscription lapses.

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, NotificationSettings, NotificationSettingsPatch, OnboardingProfile,
    OnboardingSubmission,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::SessionIdentity;
use crate::inbound::http::state::HttpState;

/// Questionnaire answers plus contact details for tokens that carry none.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    #[schema(example = "preserve")]
    pub goal: Option<String>,
    #[schema(example = "25m-100m")]
    pub net_worth_range: Option<String>,
    pub institution_count: Option<String>,
    pub entity_count: Option<String>,
    pub primary_concern: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<OnboardingRequest> for OnboardingSubmission {
    fn from(value: OnboardingRequest) -> Self {
        Self {
            profile: OnboardingProfile {
                goal: value.goal,
                net_worth_range: value.net_worth_range,
                institution_count: value.institution_count,
                entity_count: value.entity_count,
                primary_concern: value.primary_concern,
            },
            email: value.email,
            name: value.name,
        }
    }
}

/// Notification switches as exchanged with the client.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsBody {
    pub weekly_digest: bool,
    pub insight_alerts: bool,
    pub tax_alerts: bool,
}

impl From<NotificationSettings> for NotificationSettingsBody {
    fn from(value: NotificationSettings) -> Self {
        Self {
            weekly_digest: value.weekly_digest,
            insight_alerts: value.insight_alerts,
            tax_alerts: value.tax_alerts,
        }
    }
}

/// Partial update; omitted switches keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsUpdate {
    pub weekly_digest: Option<bool>,
    pub insight_alerts: Option<bool>,
    pub tax_alerts: Option<bool>,
}

impl From<NotificationSettingsUpdate> for NotificationSettingsPatch {
    fn from(value: NotificationSettingsUpdate) -> Self {
        Self {
            weekly_digest: value.weekly_digest,
            insight_alerts: value.insight_alerts,
            tax_alerts: value.tax_alerts,
        }
    }
}

/// Record questionnaire answers and seed a demo portfolio for new users.
#[utoipa::path(
    post,
    path = "/api/v1/onboarding",
    request_body = OnboardingRequest,
    responses(
        (status = 200, description = "Onboarding stored"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["account"],
    operation_id = "completeOnboarding"
)]
#[post("/onboarding")]
pub async fn complete_onboarding(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    payload: web::Json<OnboardingRequest>,
) -> ApiResult<HttpResponse> {
    let identity = session.require()?;
    state
        .accounts
        .onboard(&identity, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/api/v1/settings/notifications",
    responses(
        (status = 200, description = "Current switches", body = NotificationSettingsBody),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["account"],
    operation_id = "getNotificationSettings"
)]
#[get("/settings/notifications")]
pub async fn notification_settings(
    state: web::Data<HttpState>,
    session: SessionIdentity,
) -> ApiResult<web::Json<NotificationSettingsBody>> {
    let identity = session.require()?;
    let settings = state.accounts.notifications(&identity).await?;
    Ok(web::Json(settings.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/settings/notifications",
    request_body = NotificationSettingsUpdate,
    responses(
        (status = 200, description = "Updated switches", body = NotificationSettingsBody),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["account"],
    operation_id = "updateNotificationSettings"
)]
#[patch("/settings/notifications")]
pub async fn update_notification_settings(
    state: web::Data<HttpState>,
    session: SessionIdentity,
    payload: web::Json<NotificationSettingsUpdate>,
) -> ApiResult<web::Json<NotificationSettingsBody>> {
    let identity = session.require()?;
    let settings = state
        .accounts
        .update_notifications(&identity, payload.into_inner().into())
        .await?;
    Ok(web::Json(settings.into()))
}
