//! Document vault HTTP handlers.
//!
//! ```text
//! GET    /api/v1/documents
//! POST   /api/v1/documents   (multipart: file, name?, category?, entityId?)
//! DELETE /api/v1/documents/{id}
//! ```

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, delete, get, post, web};
use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{
    Document, DocumentMime, DocumentUpload, DocumentUploadError, Error, MAX_DOCUMENT_BYTES,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Subscriber;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional_uuid, parse_uuid};

/// Upper bound for the text parts of the upload form.
const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

/// Stored document metadata.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub blob_url: String,
    #[schema(example = "trust")]
    pub category: String,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id.to_string(),
            name: document.name,
            file_name: document.file_name,
            file_size: document.file_size,
            mime_type: document.mime_type,
            blob_url: document.blob_url,
            category: document.category.as_str().to_owned(),
            entity_id: document.entity_id.map(|id| id.to_string()),
            entity_name: document.entity_name,
            created_at: document.created_at.to_rfc3339(),
        }
    }
}

/// Summary returned after an upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocumentResponse {
    pub id: String,
    pub name: String,
    pub file_name: String,
    pub blob_url: String,
    pub category: String,
}

impl From<Document> for UploadedDocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id.to_string(),
            name: document.name,
            file_name: document.file_name,
            blob_url: document.blob_url,
            category: document.category.as_str().to_owned(),
        }
    }
}

/// Multipart form accepted by the upload endpoint.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DocumentUploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    name: Option<String>,
    #[schema(example = "general")]
    category: Option<String>,
    entity_id: Option<String>,
}

fn multipart_error(err: MultipartError) -> Error {
    debug!(error = %err, "malformed multipart body");
    Error::invalid_request("Malformed multipart body")
}

async fn read_file(mut field: Field) -> Result<(String, Vec<u8>), Error> {
    let mime = field
        .content_type()
        .map(|mime| mime.essence_str().to_owned())
        .unwrap_or_default();
    if DocumentMime::from_mime(&mime).is_none() {
        return Err(DocumentUploadError::UnsupportedType { mime }.into());
    }
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        bytes.extend_from_slice(&chunk);
        let size = bytes.len() as u64;
        if size > MAX_DOCUMENT_BYTES {
            return Err(DocumentUploadError::TooLarge { size }.into());
        }
    }
    Ok((mime, bytes))
}

async fn read_text(mut field: Field) -> Result<String, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        bytes.extend_from_slice(&chunk);
        if bytes.len() > MAX_TEXT_FIELD_BYTES {
            return Err(Error::invalid_request("Form field too large"));
        }
    }
    String::from_utf8(bytes).map_err(|_| Error::invalid_request("Form fields must be UTF-8"))
}

async fn read_upload(mut payload: Multipart) -> Result<DocumentUpload, Error> {
    let mut file = None;
    let mut name = None;
    let mut category = None;
    let mut entity_id = None;

    while let Some(field) = payload.try_next().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_owned();
        match field_name.as_str() {
            "file" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_owned();
                let (mime, bytes) = read_file(field).await?;
                file = Some((file_name, mime, bytes));
            }
            "name" => name = Some(read_text(field).await?),
            "category" => category = Some(read_text(field).await?),
            "entityId" => entity_id = Some(read_text(field).await?),
            _ => {
                read_text(field).await?;
            }
        }
    }

    let (file_name, mime_type, bytes) = file.ok_or(DocumentUploadError::MissingFile)?;
    Ok(DocumentUpload {
        file_name,
        mime_type,
        bytes,
        name,
        category,
        entity_id: parse_optional_uuid(entity_id.as_deref(), "entityId")?,
    })
}

/// List the subscriber's documents, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    responses(
        (status = 200, description = "Documents", body = [DocumentResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["documents"],
    operation_id = "listDocuments"
)]
#[get("/documents")]
pub async fn list_documents(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
) -> ApiResult<web::Json<Vec<DocumentResponse>>> {
    let documents = state.documents.list(&subscriber.user().id).await?;
    Ok(web::Json(
        documents.into_iter().map(DocumentResponse::from).collect(),
    ))
}

/// Upload a document to the vault.
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document stored", body = UploadedDocumentResponse),
        (status = 400, description = "Missing file, unsupported type or too large", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Subscription required", body = Error)
    ),
    tags = ["documents"],
    operation_id = "uploadDocument"
)]
#[post("/documents")]
pub async fn upload_document(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    payload: Multipart,
) -> ApiResult<web::Json<UploadedDocumentResponse>> {
    let upload = read_upload(payload).await?;
    let document = state
        .documents
        .upload(&subscriber.user().id, upload)
        .await?;
    Ok(web::Json(UploadedDocumentResponse::from(document)))
}

/// Delete a document and its stored file.
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 404, description = "Document not found", body = Error)
    ),
    tags = ["documents"],
    operation_id = "deleteDocument"
)]
#[delete("/documents/{id}")]
pub async fn delete_document(
    state: web::Data<HttpState>,
    subscriber: Subscriber,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let document_id = parse_uuid(&path.into_inner(), "id")?;
    state
        .documents
        .delete(&subscriber.user().id, &document_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
#[path = "documents_tests.rs"]
mod tests;
