use super::{public_object_url, validate_path, ObjectStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// Client for a hosted storage REST API (`/storage/v1/object/...`).
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpObjectStore {
    /// Create a client for `bucket` on the service at `base_url`.
    pub fn new(base_url: &str, bucket: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn object_endpoint(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    async fn check(response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(Error::Storage { status, message })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        validate_path(path)?;
        let size = bytes.len();
        let response = self
            .client
            .post(self.object_endpoint(path))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        debug!(path, size, "Uploaded object");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        validate_path(path)?;
        let response = self
            .client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, self.bucket))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await?;
        Self::check(response).await?;
        debug!(path, "Deleted object");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        public_object_url(&self.base_url, &self.bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoints() {
        let store = HttpObjectStore::new("https://db.example.co/", "memories", "key");
        assert_eq!(
            store.object_endpoint("4/a.jpg"),
            "https://db.example.co/storage/v1/object/memories/4/a.jpg"
        );
        assert_eq!(
            store.public_url("4/a.jpg"),
            "https://db.example.co/storage/v1/object/public/memories/4/a.jpg"
        );
        assert_eq!(store.bucket(), "memories");
    }

    #[tokio::test]
    async fn test_invalid_path_rejected_before_request() {
        let store = HttpObjectStore::new("http://127.0.0.1:9", "memories", "key");
        let result = store.upload("../x", Vec::new(), "image/png").await;
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_upload_posts_bytes_without_upsert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/memories/4/a.png"))
            .and(header("x-upsert", "false"))
            .and(header("content-type", "image/png"))
            .and(header("authorization", "Bearer key"))
            .and(body_bytes(b"png".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Key": "memories/4/a.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpObjectStore::new(&server.uri(), "memories", "key");
        store
            .upload("4/a.png", b"png".to_vec(), "image/png")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_rejection_maps_to_storage_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/memories/4/a.png"))
            .respond_with(ResponseTemplate::new(409).set_body_string("Duplicate"))
            .mount(&server)
            .await;

        let store = HttpObjectStore::new(&server.uri(), "memories", "key");
        let err = store
            .upload("4/a.png", b"png".to_vec(), "image/png")
            .await
            .unwrap_err();
        match err {
            Error::Storage { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Duplicate");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_sends_prefixes() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/memories"))
            .and(body_json(serde_json::json!({ "prefixes": ["4/a.png"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpObjectStore::new(&server.uri(), "memories", "key");
        store.delete("4/a.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_failure_maps_to_storage_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/memories"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let store = HttpObjectStore::new(&server.uri(), "memories", "key");
        let err = store.delete("4/a.png").await.unwrap_err();
        assert!(
            matches!(err, Error::Storage { status: 503, .. }),
            "{err:?}"
        );
    }
}
