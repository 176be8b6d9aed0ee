//! PostgreSQL-backed `EntityRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{EntityRepository, RepositoryError};
use crate::domain::{Entity, NewEntity, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{EntityRow, NewEntityRow};
use super::pool::DbPool;
use super::schema::entities;

/// Diesel-backed store for trusts, LLCs and other legal structures.
#[derive(Clone)]
pub struct DieselEntityRepository {
    pool: DbPool,
}

impl DieselEntityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository for DieselEntityRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Entity>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EntityRow> = entities::table
            .filter(entities::user_id.eq(user_id.as_uuid()))
            .order(entities::name.asc())
            .select(EntityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(EntityRow::into_domain).collect()
    }

    async fn insert(&self, entity: &NewEntity) -> Result<Entity, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewEntityRow {
            id: Uuid::new_v4(),
            user_id: *entity.user_id.as_uuid(),
            name: &entity.name,
            kind: entity.kind.as_str(),
            jurisdiction: &entity.jurisdiction,
            parent_id: entity.parent_id,
        };
        let stored: EntityRow = diesel::insert_into(entities::table)
            .values(&row)
            .returning(EntityRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        stored.into_domain()
    }

    async fn set_parent(
        &self,
        user_id: &UserId,
        entity_id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            entities::table
                .filter(entities::user_id.eq(user_id.as_uuid()))
                .filter(entities::id.eq(entity_id)),
        )
        .set(entities::parent_id.eq(parent_id))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, user_id: &UserId, entity_id: &Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            entities::table
                .filter(entities::user_id.eq(user_id.as_uuid()))
                .filter(entities::id.eq(entity_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
