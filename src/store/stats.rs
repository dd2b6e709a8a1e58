//! Win counter persistence over SQLite

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// A player's persisted win record. The display name is overwritten on each
/// win; records are never deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WinRecord {
    pub id: String,
    pub username: String,
    pub wins: i64,
}

/// Store for the win counter table
#[derive(Clone)]
pub struct StatsStore {
    pool: SqlitePool,
}

impl StatsStore {
    /// Connect to the database and create the schema if missing.
    /// One connection only: SQLite serializes writers anyway, and an
    /// in-memory url opens a separate database per connection.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (id TEXT PRIMARY KEY, username TEXT, wins INTEGER DEFAULT 0)",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    /// Upsert a win: insert with count 1, or increment and overwrite the
    /// display name. There is no dedup key; calling this twice for the same
    /// victory double-counts.
    pub async fn record_win(&self, id: &str, username: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, username, wins) VALUES (?, ?, 1) \
             ON CONFLICT(id) DO UPDATE SET wins = wins + 1, username = excluded.username",
        )
        .bind(id)
        .bind(username)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Leaderboard, best first
    pub async fn top_players(&self, limit: i64) -> Result<Vec<WinRecord>, StoreError> {
        let rows = sqlx::query_as::<_, WinRecord>(
            "SELECT id, username, wins FROM users ORDER BY wins DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Win count for a single player, if they ever won
    pub async fn wins_for(&self, id: &str) -> Result<Option<i64>, StoreError> {
        let wins = sqlx::query_scalar::<_, i64>("SELECT wins FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(wins)
    }

    /// Close the pool; every operation afterwards returns an error
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
