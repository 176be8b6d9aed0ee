//! HTTP blob store client implementing `BlobStore`.
//!
//! Objects are written with `PUT {base}/{path}` and removed with
//! `POST {base}/delete`; both carry the bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{BlobStore, BlobStoreError};
use crate::outbound::http_body::body_preview;

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    urls: [&'a str; 1],
}

/// Public-read blob store client.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpBlobStore {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

async fn checked_body(response: reqwest::Response) -> Result<Vec<u8>, BlobStoreError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| BlobStoreError::transport(err.to_string()))?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(BlobStoreError::status(status.as_u16(), body_preview(&body)))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobStoreError> {
        let response = self
            .client
            .put(self.object_url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-access", "public")
            .body(bytes)
            .send()
            .await
            .map_err(|err| BlobStoreError::transport(err.to_string()))?;
        let body = checked_body(response).await?;
        let stored: PutResponse = serde_json::from_slice(&body)
            .map_err(|err| BlobStoreError::transport(format!("invalid response: {err}")))?;
        Ok(stored.url)
    }

    async fn delete(&self, url: &str) -> Result<(), BlobStoreError> {
        let response = self
            .client
            .post(format!("{}/delete", self.base_url))
            .bearer_auth(&self.token)
            .json(&DeleteRequest { urls: [url] })
            .send()
            .await
            .map_err(|err| BlobStoreError::transport(err.to_string()))?;
        checked_body(response).await.map(|_| ())
    }
}
