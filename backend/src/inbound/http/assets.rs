//! Asset HTTP handlers.
//!
//! ```text
//! GET    /api/v1/assets
//! POST   /api/v1/assets
//! PATCH  /api/v1/assets/{id}
//! DELETE /api/v1/assets/{id}
//! DELETE /api/v1/assets/seed
//! ```
//!
//! Values cross the wire in dollars and are stored as whole cents.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Asset, AssetCategory, AssetDraft, AssetPatch, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Subscriber;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    invalid_value_error, missing_field_error, parse_optional_uuid, parse_uuid,
};

const REQUIRED_FIELDS: &str = "Name, category, and value are required";

/// Asset as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: String,
    pub name: String,
    #[schema(example = "real-estate")]
    pub category: String,
    /// Value in dollars.
    pub value: f64,
    pub currency: String,
    pub change_24h: Option<f64>,
    pub change_30d: Option<f64>,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub institution: Option<String>,
    pub account_mask: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "manual")]
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id.to_string(),
            name: asset.name,
            category: asset.category.as_str().to_owned(),
            value: asset.value.to_dollars(),
            currency: asset.currency,
            change_24h: asset.change_24h,
            change_30d: asset.change_30d,
            entity_id: asset.entity_id.map(|id| id.to_string()),
            entity_name: asset.entity_name,
            institution: asset.institution,
            account_mask: asset.account_mask,
            notes: asset.notes,
            source: asset.source.as_str().to_owned(),
            created_at: asset.created_at.to_rfc3339(),
            updated_at: asset.updated_at.to_rfc3339(),
        }
    }
}

/// Summary returned after creating an asset.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedAssetResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Value in dollars, as stored.
    pub value: f64,
    pub source: String,
}

impl From<Asset> for CreatedAssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id.to_string(),
            name: asset.name,
            category: asset.category.as_str().to_owned(),
            value: asset.value.to_dollars(),
            source: asset.source.as_str().to_owned(),
        }
    }
}

/// Request body for creating an asset.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    /// Value in dollars.
    pub value: Option<f64>,
    pub entity_id: Option<String>,
    pub notes: Option<String>,
    pub institution: Option<String>,
}

/// Request body for editing an asset; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub value: Option<f64>,
    pub entity_id: Option<String>,
    pub notes: Option<String>,
    pub institution: Option<String>,
}

fn parse_category(raw: &str) -> Result<AssetCategory, Error> {
    raw.parse()
        .map_err(|_| invalid_value_error("Unknown asset category", "category", raw))
}

fn parse_create_request(payload: CreateAssetRequest) -> Result<AssetDraft, Error> {
    let name = payload
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| missing_field_error(REQUIRED_FIELDS, "name"))?;
    let category = payload
        .category
        .ok_or_else(|| missing_field_error(REQUIRED_FIELDS, "category"))?;
    let value = payload
        .value
        .ok_or_else(|| missing_field_error(REQUIRED_FIELDS, "value"))?;
    Ok(AssetDraft {
        name,
        category: parse_category(&category)?,
        value,
        entity_id: parse_optional_uuid(payload.entity_id.as_deref(), "entityId")?,
        notes: payload.notes,
        institution: payload.institution,
    })
}

fn parse_update_request(payload: UpdateAssetRequest) -> Result<AssetPatch, Error> {
    Ok(AssetPatch {
        name: payload.name,
        category: payload.category.as_deref().map(parse_category).transpose()?,
        value: payload.value,
        entity_id: parse_optional_uuid(payload.entity_id.as_deref(), "entityId")?,
        notes: payload.notes,
        institution: payload.institution,
    })
}

/// List the subscriber's assets, largest first.
#[utoipa::path(
    get,
    path = "/api/v1/assets",
    responses(
        (status = 200, description = "Assets", body = [AssetResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["assets"],
    operation_id = "listAssets"
)]
#[get("/assets")]
pub async fn list_assets(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<Vec<AssetResponse>>> {
    let assets = state.assets.list(&subscriber.user().id).await?;
    Ok(web::Json(
        assets.into_iter().map(AssetResponse::from).collect(),
    ))
}

/// Record a manually tracked asset.
#[utoipa::path(
    post,
    path = "/api/v1/assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = CreatedAssetResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["assets"],
    operation_id = "createAsset"
)]
#[post("/assets")]
pub async fn create_asset(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    payload: web::Json<CreateAssetRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_create_request(payload.into_inner())?;
    let asset = state.assets.create(&subscriber.user().id, draft).await?;
    Ok(HttpResponse::Created().json(CreatedAssetResponse::from(asset)))
}

/// Edit one of the subscriber's assets.
#[utoipa::path(
    patch,
    path = "/api/v1/assets/{id}",
    params(("id" = String, Path, description = "Asset id")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Updated asset", body = AssetResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Asset not found", body = Error)
    ),
    tags = ["assets"],
    operation_id = "updateAsset"
)]
#[patch("/assets/{id}")]
pub async fn update_asset(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    path: web::Path<String>,
    payload: web::Json<UpdateAssetRequest>,
) -> ApiResult<web::Json<AssetResponse>> {
    let asset_id = parse_uuid(&path.into_inner(), "id")?;
    let patch = parse_update_request(payload.into_inner())?;
    let asset = state
        .assets
        .update(&subscriber.user().id, &asset_id, patch)
        .await?;
    Ok(web::Json(AssetResponse::from(asset)))
}

/// Remove the demo assets planted at onboarding.
#[utoipa::path(
    delete,
    path = "/api/v1/assets/seed",
    responses(
        (status = 200, description = "Seed assets removed"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["assets"],
    operation_id = "clearSeedAssets"
)]
#[delete("/assets/seed")]
pub async fn clear_seed_assets(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<HttpResponse> {
    let removed = state.assets.clear_seed_data(&subscriber.user().id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "removed": removed })))
}

/// Delete one of the subscriber's assets.
#[utoipa::path(
    delete,
    path = "/api/v1/assets/{id}",
    params(("id" = String, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset deleted"),
        (status = 404, description = "Asset not found", body = Error)
    ),
    tags = ["assets"],
    operation_id = "deleteAsset"
)]
#[delete("/assets/{id}")]
pub async fn delete_asset(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let asset_id = parse_uuid(&path.into_inner(), "id")?;
    state
        .assets
        .delete(&subscriber.user().id, &asset_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod tests;
