//! Legal entity HTTP handlers.
//!
//! ```text
//! GET    /api/v1/entities
//! POST   /api/v1/entities
//! DELETE /api/v1/entities/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Entity, EntityDraft, EntityKind, EntitySummary, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Subscriber;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    invalid_value_error, missing_field_error, parse_optional_uuid, parse_uuid,
};

/// Entity with its direct holdings rolled up.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "trust")]
    pub kind: String,
    pub jurisdiction: String,
    pub parent_id: Option<String>,
    pub asset_count: usize,
    /// Sum of directly held asset values, in dollars.
    pub total_value: f64,
    pub child_ids: Vec<String>,
}

impl From<EntitySummary> for EntityResponse {
    fn from(summary: EntitySummary) -> Self {
        let EntitySummary {
            entity,
            asset_count,
            total_value,
            child_ids,
        } = summary;
        Self {
            id: entity.id.to_string(),
            name: entity.name,
            kind: entity.kind.as_str().to_owned(),
            jurisdiction: entity.jurisdiction,
            parent_id: entity.parent_id.map(|id| id.to_string()),
            asset_count,
            total_value: total_value.to_dollars(),
            child_ids: child_ids.into_iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Entity as stored.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntityResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub jurisdiction: String,
    pub parent_id: Option<String>,
}

impl From<Entity> for CreatedEntityResponse {
    fn from(entity: Entity) -> Self {
        Self {
            id: entity.id.to_string(),
            name: entity.name,
            kind: entity.kind.as_str().to_owned(),
            jurisdiction: entity.jurisdiction,
            parent_id: entity.parent_id.map(|id| id.to_string()),
        }
    }
}

/// Request body for creating an entity.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub jurisdiction: Option<String>,
    pub parent_id: Option<String>,
}

fn parse_create_request(payload: CreateEntityRequest) -> Result<EntityDraft, Error> {
    let name = payload
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| missing_field_error("Name is required", "name"))?;
    let raw_kind = payload
        .kind
        .ok_or_else(|| missing_field_error("Entity type is required", "type"))?;
    let kind: EntityKind = raw_kind
        .parse()
        .map_err(|_| invalid_value_error("Unknown entity type", "type", &raw_kind))?;
    Ok(EntityDraft {
        name,
        kind,
        jurisdiction: payload.jurisdiction.unwrap_or_default(),
        parent_id: parse_optional_uuid(payload.parent_id.as_deref(), "parentId")?,
    })
}

/// List the subscriber's entities by name.
#[utoipa::path(
    get,
    path = "/api/v1/entities",
    responses(
        (status = 200, description = "Entities", body = [EntityResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["entities"],
    operation_id = "listEntities"
)]
#[get("/entities")]
pub async fn list_entities(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<Vec<EntityResponse>>> {
    let entities = state.entities.list(&subscriber.user().id).await?;
    Ok(web::Json(
        entities.into_iter().map(EntityResponse::from).collect(),
    ))
}

/// Create an entity, optionally under a parent.
#[utoipa::path(
    post,
    path = "/api/v1/entities",
    request_body = CreateEntityRequest,
    responses(
        (status = 201, description = "Entity created", body = CreatedEntityResponse),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["entities"],
    operation_id = "createEntity"
)]
#[post("/entities")]
pub async fn create_entity(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    payload: web::Json<CreateEntityRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_create_request(payload.into_inner())?;
    let entity = state.entities.create(&subscriber.user().id, draft).await?;
    Ok(HttpResponse::Created().json(CreatedEntityResponse::from(entity)))
}

/// Delete one of the subscriber's entities.
#[utoipa::path(
    delete,
    path = "/api/v1/entities/{id}",
    params(("id" = String, Path, description = "Entity id")),
    responses(
        (status = 200, description = "Entity deleted"),
        (status = 404, description = "Entity not found", body = Error)
    ),
    tags = ["entities"],
    operation_id = "deleteEntity"
)]
#[delete("/entities/{id}")]
pub async fn delete_entity(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let entity_id = parse_uuid(&path.into_inner(), "id")?;
    state
        .entities
        .delete(&subscriber.user().id, &entity_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
