//! SQLite + sqlite-vec implementation of [`DurableStore`].
//!
//! Writes embed the turn content first, then insert the `turns` row and its vector in one
//! transaction. Recall embeds the query and runs a KNN search over `turns_vec`, hydrating
//! the matching rows in distance order. Database work runs on the blocking pool.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::DurableStore;
use crate::db::embedding_to_bytes;
use crate::embedding::EmbeddingProvider;
use crate::error::StoreError;
use crate::memory::Turn;

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
    embedding: Arc<dyn EmbeddingProvider>,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>, embedding: Arc<dyn EmbeddingProvider>) -> Self {
        Self { db, embedding }
    }

    /// Shared handle to the underlying connection.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.db)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let vector = self
            .embedding
            .embed(text)
            .await
            .map_err(StoreError::Embedding)?;
        let expected = self.embedding.dimensions();
        if vector.len() != expected {
            return Err(StoreError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| StoreError::Other(format!("db lock poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn put(&self, turn: &Turn) -> Result<(), StoreError> {
        let embedding = self.embed(&turn.content).await?;
        let turn = turn.clone();

        let id = self
            .with_conn(move |conn| insert_turn(conn, &turn, &embedding))
            .await?;
        tracing::debug!(id = %id, "turn persisted");
        Ok(())
    }

    async fn query_similar(&self, text: &str, top_k: usize) -> Result<Vec<Turn>, StoreError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embed(text).await?;
        self.with_conn(move |conn| nearest_turns(conn, &embedding, top_k))
            .await
    }
}

/// Insert a turn and its vector atomically. Returns the generated row id.
pub fn insert_turn(
    conn: &mut Connection,
    turn: &Turn,
    embedding: &[f32],
) -> Result<String, StoreError> {
    let id = uuid::Uuid::now_v7().to_string();
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO turns (id, author, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![id, turn.author, turn.content, turn.timestamp_rfc3339()],
    )?;
    tx.execute(
        "INSERT INTO turns_vec (id, embedding) VALUES (?1, ?2)",
        params![id, embedding_to_bytes(embedding)],
    )?;

    tx.commit()?;
    Ok(id)
}

/// KNN search over `turns_vec`, hydrated from `turns`, nearest first.
pub fn nearest_turns(
    conn: &Connection,
    embedding: &[f32],
    limit: usize,
) -> Result<Vec<Turn>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, distance FROM turns_vec \
         WHERE embedding MATCH ?1 ORDER BY distance LIMIT ?2",
    )?;
    let ids: Vec<String> = stmt
        .query_map(params![embedding_to_bytes(embedding), limit as i64], |row| {
            row.get::<_, String>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut by_id = fetch_turns(conn, &ids)?;
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

fn fetch_turns(conn: &Connection, ids: &[String]) -> Result<HashMap<String, Turn>, StoreError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT id, author, content, timestamp FROM turns WHERE id IN ({})",
        placeholders.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut turns = HashMap::with_capacity(rows.len());
    for (id, author, content, timestamp) in rows {
        let timestamp = Turn::parse_timestamp(&timestamp)?;
        turns.insert(id, Turn::new(author, content, timestamp));
    }
    Ok(turns)
}

/// All stored turns, oldest first.
pub fn all_turns(conn: &Connection) -> Result<Vec<Turn>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT author, content, timestamp FROM turns ORDER BY timestamp, rowid")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(author, content, timestamp)| {
            Ok(Turn::new(author, content, Turn::parse_timestamp(&timestamp)?))
        })
        .collect()
}
