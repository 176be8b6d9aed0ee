//! Port for legal entity persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Entity, NewEntity, UserId};

use super::RepositoryError;

/// Reads and writes legal entities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Entities for a user ordered by name.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Entity>, RepositoryError>;

    /// Insert a new entity.
    async fn insert(&self, entity: &NewEntity) -> Result<Entity, RepositoryError>;

    /// Point an entity at its parent. Returns whether the entity exists.
    async fn set_parent(
        &self,
        user_id: &UserId,
        entity_id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<bool, RepositoryError>;

    /// Delete the user's entity. Assets and documents keep existing with a
    /// cleared entity reference.
    async fn delete(&self, user_id: &UserId, entity_id: &Uuid) -> Result<bool, RepositoryError>;
}

/// Fixture implementation holding no entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEntityRepository;

#[async_trait]
impl EntityRepository for FixtureEntityRepository {
    async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Entity>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _entity: &NewEntity) -> Result<Entity, RepositoryError> {
        Err(RepositoryError::connection("no database configured"))
    }

    async fn set_parent(
        &self,
        _user_id: &UserId,
        _entity_id: &Uuid,
        _parent_id: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _user_id: &UserId, _entity_id: &Uuid) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}
