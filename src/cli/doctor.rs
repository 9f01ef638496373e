//! CLI `doctor` command — run database diagnostics and print a health report.

use anyhow::{Context, Result};

use crate::config::EllaConfig;
use crate::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &EllaConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `ella serve` or `ella ask` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path, config.embedding.dimensions, &config.embedding.model)
        .context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Ella Health Report");
    println!("==================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("sqlite-vec:        {}", report.sqlite_vec_version);
    println!();
    println!("Embedding model:");
    println!("  Stored:          {}", report.embedding_model.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.embedding.model);
    println!(
        "  Dimensions:      {}",
        report
            .vector_dimensions
            .map(|d| d.to_string())
            .unwrap_or_else(|| "(not set)".into())
    );
    if db::meta::embedding_model_mismatch(&conn, &config.embedding.model)?.is_some() {
        println!("  WARNING: model mismatch; stored vectors come from a different model.");
    } else {
        println!("  Status:          OK (match)");
    }
    println!();
    println!("Stored turns:      {}", report.turn_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery: restore ~/.ella/chat.db from a backup, or move it aside to start fresh.");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
