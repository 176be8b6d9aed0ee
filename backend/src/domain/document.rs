//! Uploaded documents and upload validation rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UserId;

/// Largest accepted upload, in bytes (50 MiB).
pub const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMime {
    Pdf,
    Docx,
    Xlsx,
    Png,
    Jpeg,
}

impl DocumentMime {
    /// Canonical MIME type string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Match an exact MIME essence against the whitelist.
    pub fn from_mime(mime: &str) -> Option<Self> {
        [Self::Pdf, Self::Docx, Self::Xlsx, Self::Png, Self::Jpeg]
            .into_iter()
            .find(|candidate| candidate.as_str() == mime)
    }
}

/// Reasons an upload is refused before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentUploadError {
    #[error("File is required")]
    MissingFile,
    #[error("File type not allowed. Accepted: PDF, DOCX, XLSX, PNG, JPG")]
    UnsupportedType { mime: String },
    #[error("File size exceeds 50MB limit")]
    TooLarge { size: u64 },
}

/// Check MIME type and size for an upload.
///
/// # Examples
/// ```
/// use patrimony::domain::{validate_upload, DocumentMime, DocumentUploadError};
///
/// assert_eq!(validate_upload("image/png", 1024), Ok(DocumentMime::Png));
/// assert!(matches!(
///     validate_upload("text/html", 10),
///     Err(DocumentUploadError::UnsupportedType { .. })
/// ));
/// ```
pub fn validate_upload(mime: &str, size: u64) -> Result<DocumentMime, DocumentUploadError> {
    let kind = DocumentMime::from_mime(mime).ok_or_else(|| DocumentUploadError::UnsupportedType {
        mime: mime.to_owned(),
    })?;
    if size > MAX_DOCUMENT_BYTES {
        return Err(DocumentUploadError::TooLarge { size });
    }
    Ok(kind)
}

/// Filing category for a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentCategory {
    Trust,
    OperatingAgreement,
    TaxReturn,
    Insurance,
    #[default]
    General,
}

impl DocumentCategory {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trust => "trust",
            Self::OperatingAgreement => "operating-agreement",
            Self::TaxReturn => "tax-return",
            Self::Insurance => "insurance",
            Self::General => "general",
        }
    }

    /// Parse a client-provided category, falling back to `general` for
    /// anything missing or unrecognised.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for DocumentCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trust" => Ok(Self::Trust),
            "operating-agreement" => Ok(Self::OperatingAgreement),
            "tax-return" => Ok(Self::TaxReturn),
            "insurance" => Ok(Self::Insurance),
            "general" => Ok(Self::General),
            _ => Err(()),
        }
    }
}

/// Display name derived from a file name by dropping its final extension.
///
/// # Examples
/// ```
/// use patrimony::domain::default_document_name;
///
/// assert_eq!(default_document_name("trust.deed.pdf"), "trust.deed");
/// assert_eq!(default_document_name("README"), "README");
/// ```
pub fn default_document_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(index) if index + 1 < file_name.len() => file_name[..index].to_owned(),
        _ => file_name.to_owned(),
    }
}

/// Blob store key for an upload.
pub fn document_blob_path(user_id: &UserId, file_name: &str) -> String {
    format!("documents/{user_id}/{file_name}")
}

/// A stored document joined with its entity's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: Uuid,
    pub user_id: UserId,
    pub entity_id: Option<Uuid>,
    pub entity_name: Option<String>,
    pub name: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub blob_url: String,
    pub category: DocumentCategory,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a document row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub user_id: UserId,
    pub entity_id: Option<Uuid>,
    pub name: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub blob_url: String,
    pub category: DocumentCategory,
}
