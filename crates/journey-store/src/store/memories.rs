use super::{parse_timestamp, timestamp, JourneyStore};
use crate::error::{Error, Result};
use crate::types::{Memory, MemoryFilter, MemoryId, MemoryOrder, MemoryPatch, NewMemory, UserId};
use chrono::{NaiveDate, Utc};
use sqlx::Row;

const MEMORY_COLUMNS: &str =
    "id, title, description, date, location, emoji, created_at, user_id";

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

impl JourneyStore {
    // ── Memories ────────────────────────────────────────────────

    /// Insert a memory row and return it with its store-assigned fields.
    pub async fn insert_memory(&self, memory: &NewMemory) -> Result<Memory> {
        let result = sqlx::query(
            "INSERT INTO memories (title, description, date, location, emoji, created_at, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&memory.title)
        .bind(&memory.description)
        .bind(memory.date.format(DATE_FORMAT).to_string())
        .bind(&memory.location)
        .bind(&memory.emoji)
        .bind(timestamp(Utc::now()))
        .bind(memory.user_id.as_str())
        .execute(&self.pool)
        .await?;

        let id = MemoryId(result.last_insert_rowid());
        self.get_memory(id)
            .await?
            .ok_or_else(|| Error::InvalidRow(format!("memory {id} vanished after insert")))
    }

    /// Get a memory by ID.
    pub async fn get_memory(&self, id: MemoryId) -> Result<Option<Memory>> {
        let row = sqlx::query(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_memory).transpose()
    }

    /// List memories, newest first by the requested key.
    pub async fn list_memories(
        &self,
        filter: &MemoryFilter,
        order: MemoryOrder,
    ) -> Result<Vec<Memory>> {
        let order_by = match order {
            MemoryOrder::Date => "date DESC, id DESC",
            MemoryOrder::CreatedAt => "created_at DESC, id DESC",
        };
        let sql = match filter.user_id {
            Some(_) => format!(
                "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1 ORDER BY {order_by}"
            ),
            None => format!("SELECT {MEMORY_COLUMNS} FROM memories ORDER BY {order_by}"),
        };

        let mut query = sqlx::query(&sql);
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_memory).collect()
    }

    /// Apply a partial update to a memory owned by `owner`.
    ///
    /// Returns false when no row matched (missing, or owned by someone else).
    pub async fn update_memory(
        &self,
        id: MemoryId,
        owner: &UserId,
        patch: &MemoryPatch,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE memories SET
                title       = COALESCE(?1, title),
                description = COALESCE(?2, description),
                date        = COALESCE(?3, date),
                location    = CASE WHEN ?4 THEN ?5 ELSE location END,
                emoji       = CASE WHEN ?6 THEN ?7 ELSE emoji END
             WHERE id = ?8 AND user_id = ?9",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(patch.location.is_some())
        .bind(patch.location.clone().flatten())
        .bind(patch.emoji.is_some())
        .bind(patch.emoji.clone().flatten())
        .bind(id.0)
        .bind(owner.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a memory row. Returns true if a row was deleted.
    ///
    /// Media rows go with it through the foreign key cascade; callers that
    /// must also clean blobs delete the media first.
    pub async fn delete_memory(&self, id: MemoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM memories WHERE id = ?1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of stored memories.
    pub async fn memory_count(&self) -> Result<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM memories")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("cnt")? as u32)
    }

    pub(crate) fn row_to_memory(row: &sqlx::sqlite::SqliteRow) -> Result<Memory> {
        let id = MemoryId(row.try_get("id")?);
        let date_str: String = row.try_get("date")?;
        let created_str: String = row.try_get("created_at")?;
        let user_id: String = row.try_get("user_id")?;
        Ok(Memory {
            id,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .map_err(|e| Error::InvalidRow(format!("memory {id} date {date_str:?}: {e}")))?,
            location: row.try_get("location")?,
            emoji: row.try_get("emoji")?,
            created_at: parse_timestamp(&created_str)?,
            user_id: UserId::new(user_id),
        })
    }
}
