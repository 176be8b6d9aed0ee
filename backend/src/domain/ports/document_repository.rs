//! Port for document metadata persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Document, NewDocument, UserId};

use super::RepositoryError;

/// Reads and writes document metadata. Blob content lives elsewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Documents for a user, newest first, with entity names joined in.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Document>, RepositoryError>;

    /// The user's document, if it exists.
    async fn find(
        &self,
        user_id: &UserId,
        document_id: &Uuid,
    ) -> Result<Option<Document>, RepositoryError>;

    /// Insert a new document row.
    async fn insert(&self, document: &NewDocument) -> Result<Document, RepositoryError>;

    /// Delete the user's document row.
    async fn delete(&self, user_id: &UserId, document_id: &Uuid)
    -> Result<bool, RepositoryError>;
}

/// Fixture implementation holding no documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDocumentRepository;

#[async_trait]
impl DocumentRepository for FixtureDocumentRepository {
    async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Document>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn find(
        &self,
        _user_id: &UserId,
        _document_id: &Uuid,
    ) -> Result<Option<Document>, RepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _document: &NewDocument) -> Result<Document, RepositoryError> {
        Err(RepositoryError::connection("no database configured"))
    }

    async fn delete(
        &self,
        _user_id: &UserId,
        _document_id: &Uuid,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}
