//! Object storage through the storage REST API.
//!
//! Objects live under `{base}/object/{bucket}/{path}`; the public URL is
//! `{base}/object/public/{bucket}/{path}`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{BaseObjectStorage, StoredObject};

#[derive(Clone)]
pub struct HttpObjectStorage {
    http_client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl HttpObjectStorage {
    /// `base_url` is the storage API root, e.g. `https://xyz.example.co/storage/v1`.
    pub fn new(base_url: String, service_key: String, bucket: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, path)
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl BaseObjectStorage for HttpObjectStorage {
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<StoredObject> {
        let size = bytes.len();
        let response = self
            .http_client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .context("Failed to reach object storage")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Object storage returned {}: {}", status, body);
        }

        debug!(path = %path, size, "Stored object");
        Ok(StoredObject {
            path: path.to_string(),
            url: self.public_url(path),
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .context("Failed to reach object storage")?;

        let status = response.status();
        if !status.is_success() && status.as_u16() != 404 {
            let body = response.text().await.unwrap_or_default();
            bail!("Object storage returned {}: {}", status, body);
        }
        Ok(())
    }
}
