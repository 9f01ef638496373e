//! SQLite bootstrap for the conversation store: extension loading, schema,
//! creation metadata, and health checks.

pub mod meta;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Open (or create) the chat database at the given path, with sqlite-vec loaded and
/// schema initialized. A new database records `dimensions` and `embedding_model`.
pub fn open_database(
    path: impl AsRef<Path>,
    dimensions: usize,
    embedding_model: &str,
) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    load_sqlite_vec();

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(std::time::Duration::from_millis(5000))?;

    prepare(&conn, dimensions, embedding_model)?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open a fresh in-memory database with the schema initialized.
pub fn open_memory_database(dimensions: usize, embedding_model: &str) -> Result<Connection> {
    load_sqlite_vec();
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    prepare(&conn, dimensions, embedding_model)?;
    Ok(conn)
}

fn prepare(conn: &Connection, dimensions: usize, embedding_model: &str) -> Result<()> {
    schema::init_schema(conn, dimensions, embedding_model)
        .context("failed to initialize schema")?;

    let version = meta::get_schema_version(conn)?;
    anyhow::ensure!(
        version <= meta::CURRENT_SCHEMA_VERSION,
        "database schema version {version} is newer than supported version {}",
        meta::CURRENT_SCHEMA_VERSION
    );

    if let Some(stored) = meta::get_vector_dimensions(conn)? {
        anyhow::ensure!(
            stored == dimensions,
            "database vectors have {stored} dimensions but {dimensions} are configured"
        );
    }
    Ok(())
}

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            std::mem::size_of_val(embedding),
        )
    }
}

/// Result of [`check_database_health`].
#[derive(Debug)]
pub struct HealthReport {
    pub integrity_ok: bool,
    pub integrity_details: String,
    pub schema_version: u32,
    pub sqlite_vec_version: String,
    pub embedding_model: Option<String>,
    pub vector_dimensions: Option<usize>,
    pub turn_count: i64,
}

pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let integrity_details: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .context("integrity check failed to run")?;
    let sqlite_vec_version: String = conn.query_row("SELECT vec_version()", [], |row| row.get(0))?;
    let turn_count: i64 = conn.query_row("SELECT COUNT(*) FROM turns", [], |row| row.get(0))?;

    Ok(HealthReport {
        integrity_ok: integrity_details == "ok",
        integrity_details,
        schema_version: meta::get_schema_version(conn)?,
        sqlite_vec_version,
        embedding_model: meta::get_embedding_model(conn)?,
        vector_dimensions: meta::get_vector_dimensions(conn)?,
        turn_count,
    })
}
