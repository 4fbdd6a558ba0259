//! Object storage for media blobs.
//!
//! Blobs live in a single bucket under `{memory_id}/{file_name}` paths.
//! Public URLs follow the hosted storage convention
//! `{base_url}/storage/v1/object/public/{bucket}/{path}` for every backend,
//! so rows stay portable between them.

use crate::error::{Error, Result};
use async_trait::async_trait;

mod http;
mod local;

pub use http::HttpObjectStore;
pub use local::LocalObjectStore;

/// Default bucket name.
pub const DEFAULT_BUCKET: &str = "memories";

/// Blob storage used by the memory workflow.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store writes into.
    fn bucket(&self) -> &str;

    /// Store bytes at `path`. Never overwrites an existing object.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Remove the object at `path`.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Public URL for an object path.
    fn public_url(&self, path: &str) -> String;
}

/// Compose `{base_url}/storage/v1/object/public/{bucket}/{path}`.
pub fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        path.trim_start_matches('/')
    )
}

/// Reject paths that are empty or could escape the bucket.
pub(crate) fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(Error::InvalidPath(path.to_string()));
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(())
}
