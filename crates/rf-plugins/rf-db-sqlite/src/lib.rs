//! # rf-db-sqlite Implementation
//!
//! This crate implements the forum ports on top of SQLite: discussions and
//! comments as soft-deletable rows, one vote row per (element, user), and an
//! FTS5 index over discussion titles and content.
//!
//! Cascades run inside a single transaction, so a crash leaves either the
//! whole cascade applied or none of it.

mod content;
mod rows;
mod users;
mod votes;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

pub struct SqliteForumStore {
    pool: SqlitePool,
}

impl SqliteForumStore {
    /// Opens the database with a default pool size and applies migrations.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, 5).await
    }

    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is its own database, so an in-memory
        // store must keep exactly one connection alive for its whole life.
        let pool = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(in_memory = is_in_memory(url), "sqlite forum store ready");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Turns free text into an FTS5 query that ORs every quoted word, so user
/// input can never be parsed as FTS syntax.
pub(crate) fn fts_query(term: &str) -> Option<String> {
    let words: Vec<String> = term
        .split_whitespace()
        .map(|word| format!("\"{}\"", word.replace('"', "\"\"")))
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" OR "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fts_query_quotes_each_word() {
        assert_eq!(fts_query("borrow checker").as_deref(), Some("\"borrow\" OR \"checker\""));
        assert_eq!(fts_query("say \"hi\"").as_deref(), Some("\"say\" OR \"\"\"hi\"\"\""));
        assert_eq!(fts_query("   "), None);
    }

    #[test]
    fn memory_urls_are_detected() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite:file:forum?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite:rusty_forum.db"));
    }
}
