use super::JourneyStore;
use crate::error::Result;

impl JourneyStore {
    // ── Migrations ──────────────────────────────────────────────

    pub(crate) async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS memories (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
                description TEXT NOT NULL,
                date        TEXT NOT NULL,
                location    TEXT,
                emoji       TEXT,
                created_at  TEXT NOT NULL,
                user_id     TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memories_user ON memories(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memories_date ON memories(date)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS media (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                memory_id   INTEGER NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
                url         TEXT NOT NULL,
                type        TEXT NOT NULL CHECK (type IN ('image', 'video')),
                order_index INTEGER,
                created_at  TEXT NOT NULL,
                user_id     TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_media_memory
             ON media(memory_id, order_index)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
