//! Accessors for the `schema_meta` key/value table.
//!
//! Records the schema version, the vector dimensions the vec0 table was created with,
//! and the embedding model that produced the stored vectors.

use rusqlite::Connection;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

fn get_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    match conn.query_row("SELECT value FROM schema_meta WHERE key = ?1", [key], |row| {
        row.get::<_, String>(0)
    }) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    Ok(get_value(conn, "schema_version")?
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(0))
}

/// Dimensions the vec0 table was created with.
pub fn get_vector_dimensions(conn: &Connection) -> rusqlite::Result<Option<usize>> {
    Ok(get_value(conn, "vector_dimensions")?.and_then(|v| v.parse().ok()))
}

/// Get the stored embedding model identifier, if any.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    get_value(conn, "embedding_model")
}

/// The stored embedding model when it differs from `model`.
pub fn embedding_model_mismatch(conn: &Connection, model: &str) -> rusqlite::Result<Option<String>> {
    Ok(get_embedding_model(conn)?.filter(|stored| stored != model))
}
