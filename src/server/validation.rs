//! Configuration validation
//!
//! Rejects settings the server cannot run with, and insecure settings in
//! production.

use super::config::{AppConfig, StorageBackend};
use anyhow::{bail, Result};
use tracing::warn;

/// Validate configuration before any store is opened.
pub fn validate_config(config: &AppConfig, environment: &str) -> Result<()> {
    if config.storage.bucket.trim().is_empty() {
        bail!("storage.bucket must not be empty");
    }

    if config.storage.backend == StorageBackend::Http && config.storage.base_url.trim().is_empty()
    {
        bail!("storage.base_url is required when storage.backend = \"http\"");
    }

    if config.auth.enabled && config.auth.identity_url.trim().is_empty() {
        bail!("auth.identity_url is required when auth.enabled = true");
    }

    let is_production = environment.eq_ignore_ascii_case("production");
    if !is_production {
        if !config.auth.enabled {
            warn!("Authentication is disabled; every request acts as the anonymous owner");
        }
        return Ok(());
    }

    if !config.auth.enabled {
        bail!("auth.enabled must be true in production");
    }

    if config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
        );
    }

    if config.storage.backend == StorageBackend::Http && config.storage.service_key.is_empty() {
        warn!("storage.service_key is empty; the hosted store will reject uploads");
    }

    Ok(())
}
