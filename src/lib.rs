//! Chat backend with bounded conversation memory and semantic recall.
//!
//! Every incoming message is checked for vague intent first; underspecified input gets a
//! clarification prompt without touching storage or the model. Otherwise the message is
//! appended to a fixed-size per-thread buffer, persisted to a vector store, used to recall
//! similar past turns, and fused with that recall into the prompt sent to the language model.
//!
//! # Architecture
//!
//! - **Memory**: per-thread FIFO buffers of [`memory::Turn`]s (default capacity 10)
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec) KNN recall
//! - **Embeddings**: a text2vec-transformers style HTTP inference endpoint
//! - **Model**: any OpenAI-compatible chat completion API
//! - **Transport**: JSON over HTTP via axum
//!
//! # Modules
//!
//! - [`intent`] — vague-intent classifier with a bounded LRU memo
//! - [`memory`] — turns, thread buffers, and the per-thread registry
//! - [`fusion`] — prompt assembly from recall and the current message
//! - [`orchestrator`] — the request pipeline and its [`orchestrator::ChatResult`]
//! - [`store`] / [`llm`] — collaborator traits and their bundled implementations
//! - [`config`] — configuration loading from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema metadata, and health checks

pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod fusion;
pub mod intent;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod server;
pub mod store;
