//! Durable turn storage with semantic recall.
//!
//! [`DurableStore`] is the seam the orchestrator writes through. [`SqliteStore`] is the
//! bundled implementation on SQLite + sqlite-vec.

pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::memory::Turn;

pub use sqlite::SqliteStore;

#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Persist one turn. Author, content and timestamp must round-trip unchanged.
    async fn put(&self, turn: &Turn) -> Result<(), StoreError>;

    /// Up to `top_k` stored turns most similar to `text`, most similar first.
    /// An empty store yields an empty vector.
    async fn query_similar(&self, text: &str, top_k: usize) -> Result<Vec<Turn>, StoreError>;
}
