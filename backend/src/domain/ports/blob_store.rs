//! Port for document blob storage.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store clients.
    pub enum BlobStoreError {
        /// The store could not be reached.
        Transport { message: String } => "blob store request failed: {message}",
        /// The store answered with a non-success status.
        Status { status: u16, message: String } => "blob store returned {status}: {message}",
    }
}

/// Public-read object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes` under `path` and return the public URL.
    async fn put(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobStoreError>;

    /// Delete the blob at `url`.
    async fn delete(&self, url: &str) -> Result<(), BlobStoreError>;
}

/// Fixture store for deployments without blob credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBlobStore;

#[async_trait]
impl BlobStore for FixtureBlobStore {
    async fn put(
        &self,
        _path: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, BlobStoreError> {
        Err(BlobStoreError::transport("blob store not configured"))
    }

    async fn delete(&self, _url: &str) -> Result<(), BlobStoreError> {
        Ok(())
    }
}
