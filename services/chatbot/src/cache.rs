//! In-memory snapshot of the command table
//!
//! Chat lines are matched against this snapshot instead of the database.
//! Anything that writes the table refreshes the snapshot afterwards.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{Command, CommandStore};

/// Shared, cloneable command cache
#[derive(Debug, Clone, Default)]
pub struct CommandCache {
    inner: Arc<RwLock<Vec<Command>>>,
}

impl CommandCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with the current table contents
    pub async fn refresh(&self, store: &CommandStore) -> Result<()> {
        let commands = store.list().await?;
        tracing::debug!("Command cache refreshed with {} entries", commands.len());
        *self.inner.write().await = commands;
        Ok(())
    }

    /// Find the command registered for `word` in `channel`
    pub async fn lookup(&self, channel: &str, word: &str) -> Option<Command> {
        self.inner
            .read()
            .await
            .iter()
            .find(|c| c.channel == channel && c.match_expr == word)
            .cloned()
    }

    pub async fn snapshot(&self) -> Vec<Command> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
