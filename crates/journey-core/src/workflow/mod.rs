//! Memory record workflow.
//!
//! Keeps memory rows, media rows and media blobs consistent without a
//! cross-store transaction. Every write is an ordered sequence of steps:
//!
//! ```text
//! create:  memory row ─► for each file: blob ─► media row
//! update:  ownership ─► patch row ─► for each file: blob ─► media row
//! delete:  ownership ─► media rows ─► blobs (best effort) ─► memory row
//! ```
//!
//! A failed step stops the sequence and is reported; completed steps are not
//! rolled back. The only compensation is removing a blob whose media row
//! could not be written, and blob deletes during cleanup never fail the call.

use crate::error::{Result, WorkflowError};
use crate::session::SessionGate;
use chrono::Utc;
use journey_store::{
    JourneyStore, MediaId, Memory, MemoryFilter, MemoryId, MemoryOrder, MemoryWithMedia,
    NewMediaItem, ObjectStore, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod draft;
mod media;


pub use draft::{parse_date, MemoryDraft, MemoryPatchDraft};
pub use media::UploadFile;

/// Create/read/update/delete of memories and their media.
#[derive(Clone)]
pub struct MemoryWorkflow {
    store: JourneyStore,
    objects: Arc<dyn ObjectStore>,
}

impl MemoryWorkflow {
    /// Build a workflow over a relational store and an object store.
    pub fn new(store: JourneyStore, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// The relational store.
    pub fn store(&self) -> &JourneyStore {
        &self.store
    }

    /// The object store (used to derive public URLs).
    pub fn objects(&self) -> &Arc<dyn ObjectStore> {
        &self.objects
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Create a memory owned by the session's user and attach `files` in order.
    ///
    /// If an upload fails, the memory and the files before it are kept and
    /// [`WorkflowError::Upload`] is returned.
    pub async fn create(
        &self,
        draft: MemoryDraft,
        files: Vec<UploadFile>,
        session: &dyn SessionGate,
    ) -> Result<MemoryWithMedia> {
        let owner = require_user(session).await?;
        let new_memory = draft.validate(owner)?;

        let memory = self
            .store
            .insert_memory(&new_memory)
            .await
            .map_err(WorkflowError::Persistence)?;
        info!(memory_id = %memory.id, user_id = %memory.user_id, "Memory created");

        self.attach_files(&memory, files, 0).await?;
        self.get(memory.id).await
    }

    /// Apply `patch` and append `files` to a memory the session's user owns.
    ///
    /// Ownership is checked before the patch is validated. Existing media
    /// keep their positions; new files are placed after them.
    pub async fn update(
        &self,
        id: MemoryId,
        patch: MemoryPatchDraft,
        files: Vec<UploadFile>,
        session: &dyn SessionGate,
    ) -> Result<MemoryWithMedia> {
        let owner = require_user(session).await?;
        let memory = self.owned_memory(id, &owner).await?;
        let patch = patch.validate()?;

        if !patch.is_empty() {
            let updated = self
                .store
                .update_memory(id, &owner, &patch)
                .await
                .map_err(WorkflowError::Persistence)?;
            if !updated {
                return Err(WorkflowError::NotFound(format!("memory {id}")));
            }
            info!(memory_id = %id, "Memory updated");
        }

        if !files.is_empty() {
            let next_index = self
                .store
                .max_order_index(id)
                .await
                .map_err(WorkflowError::Persistence)?
                .map_or(0, |max| max + 1);
            self.attach_files(&memory, files, next_index).await?;
        }

        self.get(id).await
    }

    /// Detach one media item. Its blob is removed on a best-effort basis.
    pub async fn remove_media(&self, media_id: MediaId, session: &dyn SessionGate) -> Result<()> {
        let owner = require_user(session).await?;
        let item = self
            .store
            .get_media(media_id)
            .await
            .map_err(WorkflowError::Persistence)?
            .ok_or_else(|| WorkflowError::NotFound(format!("media {media_id}")))?;
        self.owned_memory(item.memory_id, &owner).await?;

        let deleted = self
            .store
            .delete_media(media_id)
            .await
            .map_err(WorkflowError::Persistence)?;
        if !deleted {
            return Err(WorkflowError::NotFound(format!("media {media_id}")));
        }
        self.discard_blob(&item.url).await;
        info!(media_id = %media_id, memory_id = %item.memory_id, "Media removed");
        Ok(())
    }

    /// Delete a memory, its media rows and their blobs.
    ///
    /// Media rows go first so no row ever points at a deleted blob; blob
    /// failures are logged and skipped. The memory row is removed last.
    pub async fn delete(&self, id: MemoryId, session: &dyn SessionGate) -> Result<()> {
        let owner = require_user(session).await?;
        self.owned_memory(id, &owner).await?;

        let media = self
            .store
            .media_for_memory(id)
            .await
            .map_err(WorkflowError::Persistence)?;
        let removed = self
            .store
            .delete_media_for_memory(id)
            .await
            .map_err(WorkflowError::Persistence)?;
        debug!(memory_id = %id, removed, "Media rows deleted");

        for item in &media {
            self.discard_blob(&item.url).await;
        }

        let deleted = self
            .store
            .delete_memory(id)
            .await
            .map_err(WorkflowError::Persistence)?;
        if !deleted {
            return Err(WorkflowError::NotFound(format!("memory {id}")));
        }
        info!(memory_id = %id, media = media.len(), "Memory deleted");
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Timeline read: memories plus their media, joined in memory.
    ///
    /// The two fetches are not isolated from concurrent writes; media whose
    /// memory was not part of the first fetch are dropped.
    pub async fn list(
        &self,
        filter: &MemoryFilter,
        order: MemoryOrder,
    ) -> Result<Vec<MemoryWithMedia>> {
        let memories = self
            .store
            .list_memories(filter, order)
            .await
            .map_err(WorkflowError::Persistence)?;
        let media = self
            .store
            .list_media(filter)
            .await
            .map_err(WorkflowError::Persistence)?;

        let mut by_memory: HashMap<MemoryId, Vec<_>> = HashMap::new();
        for item in media {
            by_memory.entry(item.memory_id).or_default().push(item);
        }

        let timeline: Vec<_> = memories
            .into_iter()
            .map(|memory| MemoryWithMedia {
                media: by_memory.remove(&memory.id).unwrap_or_default(),
                memory,
            })
            .collect();
        debug!(
            memories = timeline.len(),
            unmatched_media = by_memory.len(),
            "Timeline read"
        );
        Ok(timeline)
    }

    /// One memory with its ordered media.
    pub async fn get(&self, id: MemoryId) -> Result<MemoryWithMedia> {
        let memory = self
            .store
            .get_memory(id)
            .await
            .map_err(WorkflowError::Persistence)?
            .ok_or_else(|| WorkflowError::NotFound(format!("memory {id}")))?;
        let media = self
            .store
            .media_for_memory(id)
            .await
            .map_err(WorkflowError::Persistence)?;
        Ok(MemoryWithMedia { memory, media })
    }

    // ── Steps ───────────────────────────────────────────────────

    async fn owned_memory(&self, id: MemoryId, owner: &UserId) -> Result<Memory> {
        let memory = self
            .store
            .get_memory(id)
            .await
            .map_err(WorkflowError::Persistence)?
            .ok_or_else(|| WorkflowError::NotFound(format!("memory {id}")))?;
        if &memory.user_id != owner {
            warn!(memory_id = %id, user_id = %owner, "Rejected write by non-owner");
            return Err(WorkflowError::Forbidden);
        }
        Ok(memory)
    }

    /// Upload and record files one at a time, numbering from `first_index`.
    async fn attach_files(
        &self,
        memory: &Memory,
        files: Vec<UploadFile>,
        first_index: i64,
    ) -> Result<()> {
        let total = files.len();
        for (offset, file) in files.into_iter().enumerate() {
            let order_index = first_index + offset as i64;
            let kind = file.kind();
            let path = media::object_path(memory.id, &file, Utc::now().timestamp_millis());

            if let Err(e) = self
                .objects
                .upload(&path, file.bytes, &file.content_type)
                .await
            {
                warn!(
                    memory_id = %memory.id,
                    file = %file.file_name,
                    attached = offset,
                    total,
                    "Upload failed, remaining files skipped: {}",
                    e
                );
                return Err(WorkflowError::Upload(e));
            }

            let row = NewMediaItem {
                memory_id: memory.id,
                url: path.clone(),
                kind,
                order_index: Some(order_index),
                user_id: memory.user_id.clone(),
            };
            if let Err(e) = self.store.insert_media(&row).await {
                self.discard_blob(&path).await;
                return Err(WorkflowError::Persistence(e));
            }
            debug!(memory_id = %memory.id, path = %path, order_index, %kind, "Media attached");
        }
        Ok(())
    }

    /// Best-effort blob removal. Failures are logged, never returned.
    async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.objects.delete(path).await {
            warn!(path, "Failed to delete blob, leaving it orphaned: {}", e);
        }
    }
}

/// Resolve the caller once per write; no session means `Unauthorized`.
async fn require_user(session: &dyn SessionGate) -> Result<UserId> {
    session
        .current_user()
        .await?
        .ok_or(WorkflowError::Unauthorized)
}
