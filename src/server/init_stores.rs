//! Store initialization functions
//!
//! Opens the relational store and the configured object store backend.

use super::config::{AppConfig, StorageBackend};
use anyhow::{Context, Result};
use journey_store::{HttpObjectStore, JourneyStore, LocalObjectStore, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Object store plus, for the local backend, the directory to serve.
pub struct ObjectBackend {
    pub store: Arc<dyn ObjectStore>,
    pub local_dir: Option<PathBuf>,
}

/// Open the SQLite store at `database.path`
pub async fn open_store(config: &AppConfig) -> Result<JourneyStore> {
    JourneyStore::from_path(&config.database.path)
        .await
        .with_context(|| {
            format!(
                "Failed to open journey store at {}",
                config.database.path.display()
            )
        })
}

/// Build the object store selected by `storage.backend`
pub fn build_object_store(config: &AppConfig) -> Result<ObjectBackend> {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Local => {
            let local = LocalObjectStore::new(
                &storage.local_root,
                &storage.bucket,
                &config.server.public_url,
            )
            .with_context(|| {
                format!(
                    "Failed to prepare local storage at {}",
                    storage.local_root.display()
                )
            })?;
            let dir = local.bucket_dir().to_path_buf();
            Ok(ObjectBackend {
                store: Arc::new(local),
                local_dir: Some(dir),
            })
        }
        StorageBackend::Http => {
            info!(
                "Hosted object store at {} (bucket {})",
                storage.base_url, storage.bucket
            );
            Ok(ObjectBackend {
                store: Arc::new(HttpObjectStore::new(
                    &storage.base_url,
                    &storage.bucket,
                    &storage.service_key,
                )),
                local_dir: None,
            })
        }
    }
}
