use super::{public_object_url, validate_path, ObjectStore};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Filesystem-backed object store rooted at `{root}/{bucket}`.
///
/// The server exposes the bucket directory under the public object URL
/// prefix, so URLs derived here resolve against `base_url`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    dir: PathBuf,
    bucket: String,
    base_url: String,
}

impl LocalObjectStore {
    /// Create a store under `root`, creating the bucket directory.
    pub fn new(root: impl AsRef<Path>, bucket: &str, base_url: &str) -> Result<Self> {
        let dir = root.as_ref().join(bucket);
        std::fs::create_dir_all(&dir)?;
        info!("Local object store at {}", dir.display());
        Ok(Self {
            dir,
            bucket: bucket.to_string(),
            base_url: base_url.to_string(),
        })
    }

    /// Directory that holds the bucket's objects.
    pub fn bucket_dir(&self) -> &Path {
        &self.dir
    }

    fn object_path(&self, path: &str) -> Result<PathBuf> {
        validate_path(path)?;
        Ok(self.dir.join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let target = self.object_path(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        debug!(path, content_type, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.object_path(path)?;
        tokio::fs::remove_file(&target).await?;
        debug!(path, "Deleted object");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        public_object_url(&self.base_url, &self.bucket, path)
    }
}
