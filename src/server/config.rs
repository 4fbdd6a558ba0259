//! Server configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL of this server
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Request body limit for multipart uploads, in MiB
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_url: default_public_url(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn default_public_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_max_upload_mb() -> usize {
    50
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/journey.db"),
        }
    }
}

/// Which object store holds media blobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under `local_root`, served by this process
    #[default]
    Local,
    /// Hosted storage REST API at `base_url`
    Http,
}

/// Object store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: default_bucket(),
            base_url: String::new(),
            service_key: String::new(),
            local_root: default_local_root(),
        }
    }
}

fn default_bucket() -> String {
    journey_store::DEFAULT_BUCKET.to_string()
}

fn default_local_root() -> PathBuf {
    PathBuf::from("data/storage")
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Resolve callers against the identity service
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub identity_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Where signed-out clients are sent to authenticate
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            identity_url: String::new(),
            api_key: String::new(),
            login_path: default_login_path(),
        }
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}
