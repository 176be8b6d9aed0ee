//! Document vault: validated uploads to blob storage plus metadata rows.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{BlobStore, DocumentRepository, EntityRepository};
use super::{
    Document, DocumentCategory, DocumentUploadError, Error, NewDocument, UserId,
    default_document_name, document_blob_path, validate_upload,
};

/// A file received from the client with its optional form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub entity_id: Option<Uuid>,
}

impl From<DocumentUploadError> for Error {
    fn from(err: DocumentUploadError) -> Self {
        Self::invalid_request(err.to_string())
    }
}

/// Stores, lists and removes a user's documents.
#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    entities: Arc<dyn EntityRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        entities: Arc<dyn EntityRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            documents,
            entities,
            blobs,
        }
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

    /// Documents newest first.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Document>, Error> {
        Ok(self.documents.list_for_user(user_id).await?)
    }

    /// Validate, push the bytes to the blob store, then record the metadata.
    pub async fn upload(
        &self,
        user_id: &UserId,
        upload: DocumentUpload,
    ) -> Result<Document, Error> {
        let file_size = upload.bytes.len() as u64;
        let mime = validate_upload(&upload.mime_type, file_size)?;
        let category = DocumentCategory::parse_or_default(upload.category.as_deref());
        self.ensure_entity(user_id, upload.entity_id).await?;
        let name = upload
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_document_name(&upload.file_name));

        let path = document_blob_path(user_id, &upload.file_name);
        let blob_url = self
            .blobs
            .put(&path, mime.as_str(), upload.bytes)
            .await
            .map_err(|err| {
                warn!(%user_id, error = %err, "blob upload failed");
                Error::internal("Failed to upload document")
            })?;

        let document = self
            .documents
            .insert(&NewDocument {
                user_id: *user_id,
                entity_id: upload.entity_id,
                name,
                file_name: upload.file_name,
                file_size,
                mime_type: mime.as_str().to_owned(),
                blob_url,
                category,
            })
            .await?;
        info!(%user_id, document_id = %document.id, file_size, "stored document");
        Ok(document)
    }

    /// Remove the blob, then the row.
    pub async fn delete(&self, user_id: &UserId, document_id: &Uuid) -> Result<(), Error> {
        let document = self
            .documents
            .find(user_id, document_id)
            .await?
            .ok_or_else(|| Error::not_found("Document not found"))?;
        self.blobs.delete(&document.blob_url).await.map_err(|err| {
            warn!(%user_id, %document_id, error = %err, "blob delete failed");
            Error::internal("Failed to delete document")
        })?;
        self.documents.delete(user_id, document_id).await?;
        Ok(())
    }
}
