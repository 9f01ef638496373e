//! SQL DDL for the conversation store.
//!
//! Defines the `turns` table, the `turns_vec` (vec0) table, and `schema_meta`.
//! All DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

use super::meta::CURRENT_SCHEMA_VERSION;

const SCHEMA_SQL: &str = r#"
-- Persisted conversation turns
CREATE TABLE IF NOT EXISTS turns (
    id TEXT PRIMARY KEY,
    author TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_turns_timestamp ON turns(timestamp);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// The vec0 table is sized per database, so its DDL is rendered at init time.
fn vec_table_sql(dimensions: usize) -> String {
    format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS turns_vec USING vec0(\n    \
         id TEXT PRIMARY KEY,\n    \
         embedding FLOAT[{dimensions}]\n);"
    )
}

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
///
/// `dimensions` and `embedding_model` are recorded only when the database is new; an
/// existing database keeps the values it was created with.
pub fn init_schema(
    conn: &Connection,
    dimensions: usize,
    embedding_model: &str,
) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(&vec_table_sql(dimensions))?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        [CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('vector_dimensions', ?1)",
        [dimensions.to_string()],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('embedding_model', ?1)",
        [embedding_model],
    )?;

    Ok(())
}
