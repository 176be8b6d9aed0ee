//! PostgreSQL-backed `DocumentRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DocumentRepository, RepositoryError};
use crate::domain::{Document, NewDocument, UserId};

use super::diesel_helpers::{cast_size_for_db, map_diesel_error, map_pool_error};
use super::models::{DocumentRow, NewDocumentRow};
use super::pool::DbPool;
use super::schema::{documents, entities};

/// Diesel-backed document metadata store.
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Document>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(DocumentRow, Option<String>)> = documents::table
            .left_join(entities::table)
            .filter(documents::user_id.eq(user_id.as_uuid()))
            .order(documents::created_at.desc())
            .select((DocumentRow::as_select(), entities::name.nullable()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, entity_name)| row.into_domain(entity_name))
            .collect())
    }

    async fn find(
        &self,
        user_id: &UserId,
        document_id: &Uuid,
    ) -> Result<Option<Document>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(DocumentRow, Option<String>)> = documents::table
            .left_join(entities::table)
            .filter(documents::user_id.eq(user_id.as_uuid()))
            .filter(documents::id.eq(document_id))
            .select((DocumentRow::as_select(), entities::name.nullable()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|(row, entity_name)| row.into_domain(entity_name)))
    }

    async fn insert(&self, document: &NewDocument) -> Result<Document, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewDocumentRow {
            id: Uuid::new_v4(),
            user_id: *document.user_id.as_uuid(),
            entity_id: document.entity_id,
            name: &document.name,
            file_name: &document.file_name,
            file_size: cast_size_for_db(document.file_size),
            mime_type: &document.mime_type,
            blob_url: &document.blob_url,
            category: document.category.as_str(),
        };
        let stored: DocumentRow = diesel::insert_into(documents::table)
            .values(&row)
            .returning(DocumentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        // Uploads only reference an entity by id; the name is joined on read.
        Ok(stored.into_domain(None))
    }

    async fn delete(
        &self,
        user_id: &UserId,
        document_id: &Uuid,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            documents::table
                .filter(documents::user_id.eq(user_id.as_uuid()))
                .filter(documents::id.eq(document_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentCategory;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case("tax-return", DocumentCategory::TaxReturn)]
    #[case("legacy-bucket", DocumentCategory::General)]
    fn row_category_falls_back_to_general(
        #[case] raw: &str,
        #[case] expected: DocumentCategory,
    ) {
        let row = DocumentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            entity_id: None,
            name: "2025 Return".to_owned(),
            file_name: "2025-return.pdf".to_owned(),
            file_size: 2_048,
            mime_type: "application/pdf".to_owned(),
            blob_url: "https://blob.example/2025-return.pdf".to_owned(),
            category: raw.to_owned(),
            created_at: Utc::now(),
        };
        let document = row.into_domain(Some("Family Trust".to_owned()));
        assert_eq!(document.category, expected);
        assert_eq!(document.file_size, 2_048);
        assert_eq!(document.entity_name.as_deref(), Some("Family Trust"));
    }
}
