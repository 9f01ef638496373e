//! Error types for the collaborator seams.
//!
//! [`StoreError`] and [`ModelError`] are what the durable store and the language model
//! report back to the orchestrator. Application plumbing (config, bootstrap, CLI) uses
//! `anyhow` instead.

use std::time::Duration;

/// Failure writing to or querying the durable store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("embedding has {actual} dimensions, store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("store task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Other(String),
}

/// Failure obtaining a completion from the language model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request timed out after {0:?}")]
    Timeout(Duration),

    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model API error ({status}): {message}")]
    Api { status: String, message: String },

    #[error("model returned no completion")]
    EmptyCompletion,

    #[error("{0}")]
    Other(String),
}
