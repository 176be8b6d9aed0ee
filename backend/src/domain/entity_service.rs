//! Legal entity management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::ports::{AssetRepository, EntityRepository};
use super::{Entity, EntityKind, EntitySummary, Error, NewEntity, UserId, summarize_entities};

/// A new entity as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDraft {
    pub name: String,
    pub kind: EntityKind,
    pub jurisdiction: String,
    pub parent_id: Option<Uuid>,
}

/// Create, list and remove a user's entities.
#[derive(Clone)]
pub struct EntityService {
    entities: Arc<dyn EntityRepository>,
    assets: Arc<dyn AssetRepository>,
}

impl EntityService {
    pub fn new(entities: Arc<dyn EntityRepository>, assets: Arc<dyn AssetRepository>) -> Self {
        Self { entities, assets }
    }

    /// Entities ordered by name with their direct holdings rolled up.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<EntitySummary>, Error> {
        let entities = self.entities.list_for_user(user_id).await?;
        let assets = self.assets.list_for_user(user_id).await?;
        Ok(summarize_entities(&entities, &assets))
    }

    /// Store a new entity under an optional parent owned by the same user.
    pub async fn create(&self, user_id: &UserId, draft: EntityDraft) -> Result<Entity, Error> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_request("Name is required"));
        }
        if let Some(parent_id) = draft.parent_id {
            let known = self
                .entities
                .list_for_user(user_id)
                .await?
                .iter()
                .any(|entity| entity.id == parent_id);
            if !known {
                return Err(Error::invalid_request("Unknown parent entity"));
            }
        }
        let entity = self
            .entities
            .insert(&NewEntity {
                user_id: *user_id,
                name: name.to_owned(),
                kind: draft.kind,
                jurisdiction: draft.jurisdiction.trim().to_owned(),
                parent_id: draft.parent_id,
            })
            .await?;
        info!(%user_id, entity_id = %entity.id, "created entity");
        Ok(entity)
    }

    /// Remove one of the user's entities.
    pub async fn delete(&self, user_id: &UserId, entity_id: &Uuid) -> Result<(), Error> {
        if self.entities.delete(user_id, entity_id).await? {
            Ok(())
        } else {
            Err(Error::not_found("Entity not found"))
        }
    }
}
