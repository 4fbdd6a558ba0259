use super::{parse_timestamp, timestamp, JourneyStore};
use crate::error::{Error, Result};
use crate::types::{MediaId, MediaItem, MediaKind, MemoryFilter, MemoryId, NewMediaItem, UserId};
use chrono::Utc;
use sqlx::Row;

const MEDIA_COLUMNS: &str = "id, memory_id, url, type, order_index, created_at, user_id";

/// Display order: explicit positions first, unpositioned rows after, insertion order on ties.
const MEDIA_ORDER: &str = "order_index IS NULL, order_index, id";

impl JourneyStore {
    // ── Media ───────────────────────────────────────────────────

    /// Insert a media row. Fails if the parent memory does not exist.
    pub async fn insert_media(&self, item: &NewMediaItem) -> Result<MediaItem> {
        let result = sqlx::query(
            "INSERT INTO media (memory_id, url, type, order_index, created_at, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(item.memory_id.0)
        .bind(&item.url)
        .bind(item.kind.to_string())
        .bind(item.order_index)
        .bind(timestamp(Utc::now()))
        .bind(item.user_id.as_str())
        .execute(&self.pool)
        .await?;

        let id = MediaId(result.last_insert_rowid());
        self.get_media(id)
            .await?
            .ok_or_else(|| Error::InvalidRow(format!("media {id} vanished after insert")))
    }

    /// Get a media row by ID.
    pub async fn get_media(&self, id: MediaId) -> Result<Option<MediaItem>> {
        let row = sqlx::query(&format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_media).transpose()
    }

    /// All media of one memory in display order.
    pub async fn media_for_memory(&self, memory_id: MemoryId) -> Result<Vec<MediaItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE memory_id = ?1 ORDER BY {MEDIA_ORDER}"
        ))
        .bind(memory_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_media).collect()
    }

    /// All media matching the filter, grouped by memory and in display order.
    pub async fn list_media(&self, filter: &MemoryFilter) -> Result<Vec<MediaItem>> {
        let sql = match filter.user_id {
            Some(_) => format!(
                "SELECT {MEDIA_COLUMNS} FROM media WHERE user_id = ?1
                 ORDER BY memory_id, {MEDIA_ORDER}"
            ),
            None => format!("SELECT {MEDIA_COLUMNS} FROM media ORDER BY memory_id, {MEDIA_ORDER}"),
        };

        let mut query = sqlx::query(&sql);
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_media).collect()
    }

    /// Highest `order_index` used by a memory's media, if any.
    pub async fn max_order_index(&self, memory_id: MemoryId) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT MAX(order_index) AS max_idx FROM media WHERE memory_id = ?1")
            .bind(memory_id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get::<Option<i64>, _>("max_idx")?)
    }

    /// Delete one media row. Returns true if a row was deleted.
    pub async fn delete_media(&self, id: MediaId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = ?1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every media row of a memory in one statement.
    pub async fn delete_media_for_memory(&self, memory_id: MemoryId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM media WHERE memory_id = ?1")
            .bind(memory_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Number of media rows attached to a memory.
    pub async fn media_count(&self, memory_id: MemoryId) -> Result<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM media WHERE memory_id = ?1")
            .bind(memory_id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("cnt")? as u32)
    }

    pub(crate) fn row_to_media(row: &sqlx::sqlite::SqliteRow) -> Result<MediaItem> {
        let kind_str: String = row.try_get("type")?;
        let created_str: String = row.try_get("created_at")?;
        let user_id: String = row.try_get("user_id")?;
        Ok(MediaItem {
            id: MediaId(row.try_get("id")?),
            memory_id: MemoryId(row.try_get("memory_id")?),
            url: row.try_get("url")?,
            kind: MediaKind::from_str_lossy(&kind_str),
            order_index: row.try_get("order_index")?,
            created_at: parse_timestamp(&created_str)?,
            user_id: UserId::new(user_id),
        })
    }
}
