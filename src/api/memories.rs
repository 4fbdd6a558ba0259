//! Memories API endpoints
//!
//! GET    /api/memories       - Timeline (memories with media, newest first)
//! GET    /api/memories/:id   - One memory with its media
//! POST   /api/memories       - Create a memory (multipart: fields + files)
//! PATCH  /api/memories/:id   - Edit fields and append files (multipart)
//! DELETE /api/memories/:id   - Delete a memory, its media and blobs
//! DELETE /api/media/:id      - Remove one media item

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use journey_core::{MemoryDraft, MemoryPatchDraft, MemoryWorkflow, UploadFile, WorkflowError};
use journey_store::{
    MediaId, MediaItem, Memory, MemoryFilter, MemoryId, MemoryOrder, MemoryWithMedia, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::{ApiError, ApiResponse};
use crate::middleware::auth::RequestSession;

/// Shared state for memory endpoints.
#[derive(Clone)]
pub struct MemoriesState {
    workflow: MemoryWorkflow,
    login_path: Arc<str>,
}

impl MemoriesState {
    pub fn new(workflow: MemoryWorkflow, login_path: &str) -> Self {
        Self {
            workflow,
            login_path: Arc::from(login_path),
        }
    }

    fn fail(&self, err: WorkflowError) -> ApiError {
        ApiError::from_workflow(err, &self.login_path)
    }

    fn view(&self, record: MemoryWithMedia) -> MemoryView {
        let objects = self.workflow.objects();
        MemoryView {
            display_date: record.memory.display_date(),
            memory: record.memory,
            media: record
                .media
                .into_iter()
                .map(|item| MediaView {
                    public_url: objects.public_url(&item.url),
                    item,
                })
                .collect(),
        }
    }
}

/// Memory as returned to clients.
#[derive(Debug, Serialize)]
pub struct MemoryView {
    #[serde(flatten)]
    pub memory: Memory,
    /// e.g. "January 1, 2024"
    pub display_date: String,
    pub media: Vec<MediaView>,
}

/// Media item with its public URL.
#[derive(Debug, Serialize)]
pub struct MediaView {
    #[serde(flatten)]
    pub item: MediaItem,
    pub public_url: String,
}

/// Id of a deleted record.
#[derive(Debug, Serialize)]
pub struct DeletedView {
    pub id: i64,
}

/// Timeline query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `date` (default) or `created_at`
    #[serde(default)]
    pub order: MemoryOrder,
    /// Only memories owned by this user
    pub owner: Option<String>,
}

/// Multipart form: text fields by name plus every file part.
#[derive(Default)]
struct MemoryForm {
    fields: HashMap<String, String>,
    files: Vec<UploadFile>,
}

impl MemoryForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?;
                    // An untouched file input still submits an empty part.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files
                        .push(UploadFile::new(file_name, content_type, bytes.to_vec()));
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    fn draft(&mut self) -> MemoryDraft {
        MemoryDraft {
            title: self.fields.remove("title").unwrap_or_default(),
            description: self.fields.remove("description").unwrap_or_default(),
            date: self.fields.remove("date").unwrap_or_default(),
            location: self.fields.remove("location"),
            emoji: self.fields.remove("emoji"),
        }
    }

    /// Fields present in the form are changed; blank location/emoji clear them.
    fn patch(&mut self) -> MemoryPatchDraft {
        MemoryPatchDraft {
            title: self.fields.remove("title"),
            description: self.fields.remove("description"),
            date: self.fields.remove("date"),
            location: self.fields.remove("location"),
            emoji: self.fields.remove("emoji"),
        }
    }
}

/// Timeline of all memories, newest first. No session required.
async fn list_memories(
    State(state): State<MemoriesState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<MemoryView>>>, ApiError> {
    let filter = MemoryFilter {
        user_id: query.owner.map(UserId::new),
    };
    let timeline = state
        .workflow
        .list(&filter, query.order)
        .await
        .map_err(|e| state.fail(e))?;
    let views = timeline.into_iter().map(|m| state.view(m)).collect();
    Ok(Json(ApiResponse::success(views)))
}

async fn get_memory(
    State(state): State<MemoriesState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MemoryView>>, ApiError> {
    let record = state
        .workflow
        .get(MemoryId(id))
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(ApiResponse::success(state.view(record))))
}

async fn create_memory(
    RequestSession(session): RequestSession,
    State(state): State<MemoriesState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MemoryView>>), ApiError> {
    let mut form = MemoryForm::read(multipart).await?;
    debug!(files = form.files.len(), "Create memory request");
    let draft = form.draft();
    let record = state
        .workflow
        .create(draft, form.files, session.as_ref())
        .await
        .map_err(|e| state.fail(e))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(state.view(record))),
    ))
}

async fn update_memory(
    RequestSession(session): RequestSession,
    State(state): State<MemoriesState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MemoryView>>, ApiError> {
    let mut form = MemoryForm::read(multipart).await?;
    let patch = form.patch();
    let record = state
        .workflow
        .update(MemoryId(id), patch, form.files, session.as_ref())
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(ApiResponse::success(state.view(record))))
}

async fn delete_memory(
    RequestSession(session): RequestSession,
    State(state): State<MemoriesState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedView>>, ApiError> {
    state
        .workflow
        .delete(MemoryId(id), session.as_ref())
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(ApiResponse::success(DeletedView { id })))
}

async fn delete_media(
    RequestSession(session): RequestSession,
    State(state): State<MemoriesState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedView>>, ApiError> {
    state
        .workflow
        .remove_media(MediaId(id), session.as_ref())
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(ApiResponse::success(DeletedView { id })))
}

/// Create memory routes
pub fn memories_routes(state: MemoriesState) -> Router {
    Router::new()
        .route("/api/memories", get(list_memories).post(create_memory))
        .route(
            "/api/memories/:id",
            get(get_memory).patch(update_memory).delete(delete_memory),
        )
        .route("/api/media/:id", delete(delete_media))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::SessionProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use axum::Extension;
    use journey_core::{IdentityClient, StaticSession};
    use journey_store::{JourneyStore, LocalObjectStore, MediaKind};
    use tower::ServiceExt;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOUNDARY: &str = "journey-test-boundary";

    async fn setup() -> (MemoriesState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JourneyStore::in_memory().await.unwrap();
        let objects =
            LocalObjectStore::new(dir.path(), "memories", "http://localhost:3000").unwrap();
        let workflow = MemoryWorkflow::new(store, Arc::new(objects));
        (MemoriesState::new(workflow, "/login"), dir)
    }

    fn app(state: MemoriesState, provider: SessionProvider) -> Router {
        memories_routes(state).layer(Extension(provider))
    }

    fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (file_name, content_type, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(method: &str, uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn trip_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("title", "Trip"),
            ("description", "Fun"),
            ("date", "2024-01-01"),
            ("location", "Paris"),
            ("emoji", ""),
        ]
    }

    #[tokio::test]
    async fn test_create_via_multipart_then_list() {
        let (state, dir) = setup().await;
        let body = multipart_body(
            &trip_fields(),
            &[
                ("img1.jpg", "image/jpeg", &b"first"[..]),
                ("clip.mp4", "video/mp4", &b"second"[..]),
            ],
        );

        let response = app(state.clone(), SessionProvider::Disabled)
            .oneshot(multipart_request("POST", "/api/memories", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["title"], "Trip");
        assert_eq!(json["data"]["user_id"], StaticSession::ANONYMOUS);
        assert!(json["data"]["emoji"].is_null());
        assert_eq!(json["data"]["display_date"], "January 1, 2024");
        assert_eq!(json["data"]["media"][0]["type"], "image");
        assert_eq!(json["data"]["media"][1]["type"], "video");

        let Json(listed) = list_memories(State(state), Query(ListQuery::default()))
            .await
            .unwrap();
        let timeline = listed.data.unwrap();
        assert_eq!(timeline.len(), 1);
        let media = &timeline[0].media;
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].item.kind, MediaKind::Image);
        assert_eq!(media[0].item.order_index, Some(0));
        assert_eq!(media[1].item.order_index, Some(1));
        assert_eq!(
            media[0].public_url,
            format!(
                "http://localhost:3000/storage/v1/object/public/memories/{}",
                media[0].item.url
            )
        );
        let stored = std::fs::read(dir.path().join("memories").join(&media[0].item.url)).unwrap();
        assert_eq!(stored, b"first");
    }

    #[tokio::test]
    async fn test_create_signed_out_returns_login_url() {
        let (state, _dir) = setup().await;
        let provider =
            SessionProvider::Identity(Arc::new(IdentityClient::new("http://127.0.0.1:9", "anon")));
        let body = multipart_body(&trip_fields(), &[]);

        let response = app(state.clone(), provider)
            .oneshot(multipart_request("POST", "/api/memories", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["login_url"], "/login");
        assert_eq!(state.workflow.store().memory_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_date() {
        let (state, _dir) = setup().await;
        let body = multipart_body(
            &[("title", "Trip"), ("description", "Fun"), ("date", "soon")],
            &[],
        );
        let response = app(state, SessionProvider::Disabled)
            .oneshot(multipart_request("POST", "/api/memories", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_appends_media() {
        let (state, _dir) = setup().await;
        let created = state
            .workflow
            .create(
                MemoryDraft {
                    title: "Trip".into(),
                    description: "Fun".into(),
                    date: "2024-01-01".into(),
                    ..Default::default()
                },
                vec![UploadFile::new("a.jpg", "image/jpeg", b"a".to_vec())],
                &StaticSession::anonymous(),
            )
            .await
            .unwrap();

        let body = multipart_body(
            &[("title", "Trip to Paris"), ("location", "Paris")],
            &[("b.png", "image/png", &b"b"[..])],
        );
        let uri = format!("/api/memories/{}", created.memory.id);
        let response = app(state, SessionProvider::Disabled)
            .oneshot(multipart_request("PATCH", &uri, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["title"], "Trip to Paris");
        assert_eq!(json["data"]["description"], "Fun");
        assert_eq!(json["data"]["location"], "Paris");
        assert_eq!(json["data"]["media"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"]["media"][1]["order_index"], 1);
    }

    /// Identity service that knows `u1-token` and `u2-token`.
    async fn identity_server() -> MockServer {
        let server = MockServer::start().await;
        for user in ["u1", "u2"] {
            Mock::given(method("GET"))
                .and(path("/auth/v1/user"))
                .and(header_eq("authorization", format!("Bearer {user}-token").as_str()))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": user })),
                )
                .mount(&server)
                .await;
        }
        server
    }

    #[tokio::test]
    async fn test_patch_checks_owner_before_fields() {
        let (state, _dir) = setup().await;
        let server = identity_server().await;
        let provider =
            SessionProvider::Identity(Arc::new(IdentityClient::new(&server.uri(), "anon")));
        let created = state
            .workflow
            .create(
                MemoryDraft {
                    title: "Trip".into(),
                    description: "Fun".into(),
                    date: "2024-01-01".into(),
                    ..Default::default()
                },
                Vec::new(),
                &StaticSession::signed_in("u1"),
            )
            .await
            .unwrap();
        let uri = format!("/api/memories/{}", created.memory.id);

        for (token, expected) in [
            (None, StatusCode::UNAUTHORIZED),
            (Some("u2-token"), StatusCode::FORBIDDEN),
            (Some("u1-token"), StatusCode::BAD_REQUEST),
        ] {
            let mut request = multipart_request(
                "PATCH",
                &uri,
                multipart_body(&[("date", "not-a-date")], &[]),
            );
            if let Some(token) = token {
                request.headers_mut().insert(
                    header::AUTHORIZATION,
                    format!("Bearer {token}").parse().unwrap(),
                );
            }
            let response = app(state.clone(), provider.clone())
                .oneshot(request)
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "token {token:?}");
        }

        let missing = app(state.clone(), provider)
            .oneshot({
                let mut request = multipart_request(
                    "PATCH",
                    "/api/memories/999",
                    multipart_body(&[("date", "not-a-date")], &[]),
                );
                request
                    .headers_mut()
                    .insert(header::AUTHORIZATION, "Bearer u1-token".parse().unwrap());
                request
            })
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let after = state.workflow.get(created.memory.id).await.unwrap();
        assert_eq!(after, created);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let (state, _dir) = setup().await;
        let created = state
            .workflow
            .create(
                MemoryDraft {
                    title: "Trip".into(),
                    description: "Fun".into(),
                    date: "2024-01-01".into(),
                    ..Default::default()
                },
                vec![UploadFile::new("a.jpg", "image/jpeg", b"a".to_vec())],
                &StaticSession::signed_in("u1"),
            )
            .await
            .unwrap();
        let id = created.memory.id.0;

        let err = delete_memory(
            RequestSession(Arc::new(StaticSession::signed_in("u2"))),
            State(state.clone()),
            Path(id),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = delete_media(
            RequestSession(Arc::new(StaticSession::signed_in("u2"))),
            State(state.clone()),
            Path(created.media[0].id.0),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let Json(deleted) = delete_memory(
            RequestSession(Arc::new(StaticSession::signed_in("u1"))),
            State(state.clone()),
            Path(id),
        )
        .await
        .unwrap();
        assert!(deleted.success);

        let err = get_memory(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_filters_by_owner() {
        let (state, _dir) = setup().await;
        for (owner, title) in [("u1", "Mine"), ("u2", "Theirs")] {
            state
                .workflow
                .create(
                    MemoryDraft {
                        title: title.into(),
                        description: "Fun".into(),
                        date: "2024-01-01".into(),
                        ..Default::default()
                    },
                    Vec::new(),
                    &StaticSession::signed_in(owner),
                )
                .await
                .unwrap();
        }

        let Json(listed) = list_memories(
            State(state),
            Query(ListQuery {
                owner: Some("u1".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let timeline = listed.data.unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].memory.title, "Mine");
    }
}
