//! Manual asset management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::ports::{AssetRepository, EntityRepository};
use super::{Asset, AssetCategory, AssetSource, AssetUpdate, Cents, Error, NewAsset, UserId};

/// A manually entered asset, value in dollars.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDraft {
    pub name: String,
    pub category: AssetCategory,
    pub value: f64,
    pub entity_id: Option<Uuid>,
    pub notes: Option<String>,
    pub institution: Option<String>,
}

/// Partial edit of an asset, value in dollars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub category: Option<AssetCategory>,
    pub value: Option<f64>,
    pub entity_id: Option<Uuid>,
    pub notes: Option<String>,
    pub institution: Option<String>,
}

fn dollars_to_cents(value: f64) -> Result<Cents, Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_request("Value must be a positive number"));
    }
    Cents::from_dollars(value).map_err(|err| Error::invalid_request(err.to_string()))
}

fn not_found() -> Error {
    Error::not_found("Asset not found")
}

/// Create, edit and remove a user's assets.
#[derive(Clone)]
pub struct AssetService {
    assets: Arc<dyn AssetRepository>,
    entities: Arc<dyn EntityRepository>,
}

impl AssetService {
    pub fn new(assets: Arc<dyn AssetRepository>, entities: Arc<dyn EntityRepository>) -> Self {
        Self { assets, entities }
    }

    /// Assets ordered by value, largest first.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Asset>, Error> {
        Ok(self.assets.list_for_user(user_id).await?)
    }

    async fn ensure_entity(&self, user_id: &UserId, entity_id: Option<Uuid>) -> Result<(), Error> {
        let Some(entity_id) = entity_id else {
            return Ok(());
        };
        let owned = self
            .entities
            .list_for_user(user_id)
            .await?
            .iter()
            .any(|entity| entity.id == entity_id);
        if owned {
            Ok(())
        } else {
            Err(Error::invalid_request("Unknown entity"))
        }
    }

    /// Store a manual asset. The value is kept as whole cents.
    pub async fn create(&self, user_id: &UserId, draft: AssetDraft) -> Result<Asset, Error> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_request(
                "Name, category, and value are required",
            ));
        }
        let value = dollars_to_cents(draft.value)?;
        self.ensure_entity(user_id, draft.entity_id).await?;

        let asset = NewAsset {
            entity_id: draft.entity_id,
            notes: draft.notes,
            institution: draft.institution,
            ..NewAsset::manual(*user_id, name.to_owned(), draft.category, value)
        };
        let stored = self.assets.insert(&asset).await?;
        info!(%user_id, asset_id = %stored.id, "created asset");
        Ok(stored)
    }

    /// Edit one of the user's assets.
    pub async fn update(
        &self,
        user_id: &UserId,
        asset_id: &Uuid,
        patch: AssetPatch,
    ) -> Result<Asset, Error> {
        let value = patch.value.map(dollars_to_cents).transpose()?;
        self.ensure_entity(user_id, patch.entity_id).await?;
        let update = AssetUpdate {
            name: patch.name.filter(|name| !name.trim().is_empty()),
            category: patch.category,
            value,
            entity_id: patch.entity_id,
            institution: patch.institution,
            account_mask: None,
            notes: patch.notes,
        };
        self.assets
            .update(user_id, asset_id, &update)
            .await?
            .ok_or_else(not_found)
    }

    /// Remove one of the user's assets.
    pub async fn delete(&self, user_id: &UserId, asset_id: &Uuid) -> Result<(), Error> {
        if self.assets.delete(user_id, asset_id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Remove the demo assets planted at onboarding.
    pub async fn clear_seed_data(&self, user_id: &UserId) -> Result<u64, Error> {
        let removed = self
            .assets
            .delete_by_source(user_id, AssetSource::Seed)
            .await?;
        info!(%user_id, removed, "cleared seed assets");
        Ok(removed)
    }
}
