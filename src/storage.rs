//! Object storage gateway for product images.
//!
//! The service only ever needs three operations against the hosted bucket:
//! upload bytes under a path, derive the public URL for a path, and delete a
//! path. `BucketClient` talks to a hosted bucket's REST API; the in-memory
//! backend serves development and tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::errors::ServiceError;

/// Folder inside the bucket that holds product images
const PRODUCT_IMAGE_PREFIX: &str = "products";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::StorageError(err.to_string())
    }
}

/// Gateway to a hosted object-storage bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads `bytes` under `path` and returns the object's public URL.
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Public URL an object at `path` is served from.
    fn public_url(&self, path: &str) -> String;

    /// Removes the object at `path`.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// Derives the bucket path for a product image: the SKU plus the upload
/// instant, so repeated uploads for the same SKU never collide.
pub fn image_object_path(sku: &str, filename: &str) -> String {
    let ext = filename.rsplit('.').next().filter(|e| *e != filename);
    match ext {
        Some(ext) => format!(
            "{}/{}-{}.{}",
            PRODUCT_IMAGE_PREFIX,
            sku,
            Utc::now().timestamp_millis(),
            ext
        ),
        None => format!(
            "{}/{}-{}",
            PRODUCT_IMAGE_PREFIX,
            sku,
            Utc::now().timestamp_millis()
        ),
    }
}

/// Recovers the bucket path from a stored public URL by cutting at the
/// product-image folder. Returns `None` for URLs this service never wrote.
pub fn object_path_from_url(url: &str) -> Option<String> {
    let segments: Vec<&str> = url
        .split('/')
        .skip_while(|segment| *segment != PRODUCT_IMAGE_PREFIX)
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Client for a hosted bucket service exposing the standard object REST API.
pub struct BucketClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl BucketClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            bucket: bucket.into(),
        }
    }

    /// Builds a client from the storage section of the app config.
    /// Fails when the bucket backend is selected without credentials.
    pub fn from_config(cfg: &StorageConfig) -> Result<Self, ServiceError> {
        match (&cfg.url, &cfg.key) {
            (Some(url), Some(key)) => Ok(Self::new(
                url.trim_end_matches('/').to_string(),
                key.clone(),
                cfg.bucket.clone(),
            )),
            _ => Err(ServiceError::InternalError(
                "Storage credentials not configured: set APP__STORAGE__URL and APP__STORAGE__KEY"
                    .to_string(),
            )),
        }
    }
}

#[async_trait]
impl ObjectStorage for BucketClient {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let endpoint = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload(format!("{}: {}", status, body)));
        }

        info!(path, "uploaded object");
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let endpoint = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);

        let response = self
            .http
            .delete(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Delete(format!("{}: {}", status, body)));
        }

        info!(path, "deleted object");
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Bytes,
    content_type: String,
}

/// In-memory storage backend for development and tests. Records every
/// delete so tests can assert on cleanup behavior, and can be told to fail
/// deletes to exercise the best-effort cleanup path.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: RwLock<HashMap<String, StoredObject>>,
    deleted: RwLock<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an object currently exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.objects.read().unwrap().contains_key(path)
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    /// Paths passed to successful `delete` calls, in order.
    pub fn deleted_paths(&self) -> Vec<String> {
        self.deleted.read().unwrap().clone()
    }

    /// Content type recorded for `path`, if the object exists.
    pub fn content_type_of(&self, path: &str) -> Option<String> {
        self.objects
            .read()
            .unwrap()
            .get(path)
            .map(|o| o.content_type.clone())
    }

    /// Stored bytes for `path`, if the object exists.
    pub fn object_bytes(&self, path: &str) -> Option<Bytes> {
        self.objects.read().unwrap().get(path).map(|o| o.bytes.clone())
    }

    /// Makes subsequent `delete` calls fail.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.objects.write().unwrap().insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );

        debug!(path, "stored object in memory");
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.local/object/public/products-images/{}", path)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Delete(format!(
                "simulated failure deleting {}",
                path
            )));
        }

        self.objects.write().unwrap().remove(path);
        self.deleted.write().unwrap().push(path.to_string());
        Ok(())
    }
}
