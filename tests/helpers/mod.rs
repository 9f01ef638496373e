#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use ella::config::ConversationConfig;
use ella::embedding::{l2_normalize, EmbeddingProvider};
use ella::error::{ModelError, StoreError};
use ella::llm::LanguageModel;
use ella::memory::Turn;
use ella::orchestrator::ConversationOrchestrator;
use ella::store::{DurableStore, SqliteStore};

pub const DIMS: usize = 32;
pub const EMBEDDING_MODEL: &str = "word-hash";

/// Bag-of-words hashing embedder: texts sharing words land near each other.
pub struct WordHashEmbedding;

#[async_trait]
impl EmbeddingProvider for WordHashEmbedding {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIMS];
        for word in text.split_whitespace() {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % DIMS] += 1.0;
        }
        Ok(l2_normalize(&v))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn model_id(&self) -> &str {
        EMBEDDING_MODEL
    }
}

/// In-memory SQLite store backed by [`WordHashEmbedding`].
pub fn sqlite_store() -> SqliteStore {
    let conn = ella::db::open_memory_database(DIMS, EMBEDDING_MODEL).unwrap();
    SqliteStore::new(Arc::new(Mutex::new(conn)), Arc::new(WordHashEmbedding))
}

/// Store fake with call counters and switchable failures.
#[derive(Default)]
pub struct ScriptedStore {
    pub puts: Mutex<Vec<Turn>>,
    pub queries: AtomicUsize,
    pub recall: Vec<Turn>,
    pub fail_put: bool,
    pub fail_query: bool,
}

impl ScriptedStore {
    pub fn with_recall(recall: Vec<Turn>) -> Self {
        Self {
            recall,
            ..Self::default()
        }
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for ScriptedStore {
    async fn put(&self, turn: &Turn) -> Result<(), StoreError> {
        if self.fail_put {
            return Err(StoreError::Other("store offline".into()));
        }
        self.puts.lock().unwrap().push(turn.clone());
        Ok(())
    }

    async fn query_similar(&self, _text: &str, top_k: usize) -> Result<Vec<Turn>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_query {
            return Err(StoreError::Other("recall offline".into()));
        }
        Ok(self.recall.iter().take(top_k).cloned().collect())
    }
}

pub enum Reply {
    Text(String),
    Fail,
    Panic,
}

/// Model fake that records prompts.
pub struct ScriptedModel {
    pub prompts: Mutex<Vec<String>>,
    reply: Reply,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            reply: Reply::Text(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            reply: Reply::Fail,
        }
    }

    pub fn panicking() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            reply: Reply::Panic,
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(ModelError::Timeout(std::time::Duration::from_secs(60))),
            Reply::Panic => panic!("model client bug"),
        }
    }
}

pub fn orchestrator(
    store: Arc<dyn DurableStore>,
    model: Arc<dyn LanguageModel>,
) -> ConversationOrchestrator {
    ConversationOrchestrator::new(store, model, &ConversationConfig::default())
}

pub fn turn(author: &str, content: &str) -> Turn {
    Turn::new(author, content, Utc::now())
}
