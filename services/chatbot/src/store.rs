//! SQLite-backed command table
//!
//! Rows are keyed by `(channel, match_expr)`; writing an existing key
//! replaces its command text.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::Result;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS commands (
    channel TEXT NOT NULL,
    match_expr TEXT NOT NULL,
    command TEXT NOT NULL,
    PRIMARY KEY (channel, match_expr)
)
"#;

/// A bot command as stored and as served by `/api/commands/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Command {
    pub channel: String,
    pub match_expr: String,
    pub command: String,
}

impl Command {
    pub fn new(
        channel: impl Into<String>,
        match_expr: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            match_expr: match_expr.into(),
            command: command.into(),
        }
    }
}

/// Handle to the command database; cheap to clone
#[derive(Debug, Clone)]
pub struct CommandStore {
    pool: SqlitePool,
}

impl CommandStore {
    /// Open or create the database at `path`, creating the table if needed
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;

        info!(path = %path.display(), "Command database opened");
        Ok(store)
    }

    /// Private in-memory database
    ///
    /// Pinned to a single connection that is never recycled, since every
    /// new in-memory connection is an empty database.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert or replace a command, returning the number of rows changed
    pub async fn upsert(&self, command: &Command) -> Result<u64> {
        debug!(
            "Setting '{}' in #{} to '{}'",
            command.match_expr, command.channel, command.command
        );

        let result = sqlx::query(
            r#"
            REPLACE INTO commands (channel, match_expr, command)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&command.channel)
        .bind(&command.match_expr)
        .bind(&command.command)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a command, returning the number of rows removed
    pub async fn remove(&self, channel: &str, match_expr: &str) -> Result<u64> {
        debug!("Removing '{}' from #{}", match_expr, channel);

        let result = sqlx::query("DELETE FROM commands WHERE channel = ? AND match_expr = ?")
            .bind(channel)
            .bind(match_expr)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// All commands, ordered by channel then match expression
    pub async fn list(&self) -> Result<Vec<Command>> {
        let commands = sqlx::query_as::<_, Command>(
            "SELECT channel, match_expr, command FROM commands ORDER BY channel, match_expr",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(commands)
    }

    /// Commands of a single channel
    pub async fn list_channel(&self, channel: &str) -> Result<Vec<Command>> {
        let commands = sqlx::query_as::<_, Command>(
            r#"
            SELECT channel, match_expr, command FROM commands
            WHERE channel = ?
            ORDER BY match_expr
            "#,
        )
        .bind(channel)
        .fetch_all(&self.pool)
        .await?;

        Ok(commands)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_store_is_empty() {
        let store = CommandStore::open_in_memory().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let store = CommandStore::open_in_memory().await.unwrap();

        store
            .upsert(&Command::new("chan", "!discord", "join us"))
            .await
            .unwrap();
        store
            .upsert(&Command::new("chan", "!discord", "discord.gg/abc"))
            .await
            .unwrap();

        let commands = store.list().await.unwrap();
        assert_eq!(commands, vec![Command::new("chan", "!discord", "discord.gg/abc")]);
    }

    #[tokio::test]
    async fn same_match_in_different_channels_is_distinct() {
        let store = CommandStore::open_in_memory().await.unwrap();
        store.upsert(&Command::new("b", "!hi", "hello b")).await.unwrap();
        store.upsert(&Command::new("a", "!hi", "hello a")).await.unwrap();

        let commands = store.list().await.unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].channel, "a");
        assert_eq!(commands[1].channel, "b");

        let only_b = store.list_channel("b").await.unwrap();
        assert_eq!(only_b, vec![Command::new("b", "!hi", "hello b")]);
    }

    #[tokio::test]
    async fn remove_reports_rows_changed() {
        let store = CommandStore::open_in_memory().await.unwrap();
        store.upsert(&Command::new("chan", "!hi", "hello")).await.unwrap();

        assert_eq!(store.remove("chan", "!hi").await.unwrap(), 1);
        assert_eq!(store.remove("chan", "!hi").await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_creates_file_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("commands.sqlite3");

        let store = CommandStore::open(&path).await.unwrap();
        store.upsert(&Command::new("chan", "!hi", "hello")).await.unwrap();
        store.close().await;
        assert!(path.exists());

        let reopened = CommandStore::open(&path).await.unwrap();
        assert_eq!(reopened.list().await.unwrap().len(), 1);
    }
}
