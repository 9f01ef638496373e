//! Request-level conversation pipeline.
//!
//! Each incoming message moves through
//! `Received → Classified → (ShortCircuited | Stored → Recalled → Fused → Answered → Persisted)`.
//! Vague input is answered with [`CLARIFICATION_PROMPT`] before any memory, store or model
//! work happens. Store failures degrade durability or recall but never abort the request;
//! model failures do. Nothing is retried or rolled back.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;

use crate::config::ConversationConfig;
use crate::error::ModelError;
use crate::fusion::fuse;
use crate::intent::IntentClassifier;
use crate::llm::LanguageModel;
use crate::memory::types::ASSISTANT_AUTHOR;
use crate::memory::{ThreadRegistry, Turn, DEFAULT_THREAD};
use crate::store::DurableStore;

/// Fixed reply for messages classified as too vague.
pub const CLARIFICATION_PROMPT: &str = "Could you be a little more specific?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Empty or whitespace-only message.
    Validation,
    /// The language model call failed or timed out.
    Model,
    /// Anything unexpected inside the pipeline.
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Model => "model",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one [`ConversationOrchestrator::handle_message`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResult {
    Clarify {
        text: String,
    },
    Answer {
        /// Thread contents before the assistant reply was appended.
        prior_context: Vec<Turn>,
        response: String,
    },
    Failure {
        kind: FailureKind,
        detail: String,
    },
}

#[derive(Debug)]
enum PipelineError {
    Validation(String),
    Model(ModelError),
}

pub struct ConversationOrchestrator {
    classifier: IntentClassifier,
    threads: ThreadRegistry,
    store: Arc<dyn DurableStore>,
    model: Arc<dyn LanguageModel>,
    recall_top_k: usize,
}

impl ConversationOrchestrator {
    pub fn new(
        store: Arc<dyn DurableStore>,
        model: Arc<dyn LanguageModel>,
        config: &ConversationConfig,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(config.intent_cache_size),
            threads: ThreadRegistry::new(config.thread_capacity, config.max_threads),
            store,
            model,
            recall_top_k: config.recall_top_k,
        }
    }

    /// Run one message through the pipeline on the default thread.
    pub async fn handle_message(&self, author: &str, message: &str) -> ChatResult {
        self.handle_message_in(DEFAULT_THREAD, author, message).await
    }

    /// Run one message through the pipeline on the named thread.
    pub async fn handle_message_in(&self, thread_id: &str, author: &str, message: &str) -> ChatResult {
        let outcome = AssertUnwindSafe(self.run(thread_id, author, message))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(PipelineError::Validation(detail))) => ChatResult::Failure {
                kind: FailureKind::Validation,
                detail,
            },
            Ok(Err(PipelineError::Model(e))) => {
                tracing::error!(thread_id, error = %e, "language model call failed");
                ChatResult::Failure {
                    kind: FailureKind::Model,
                    detail: e.to_string(),
                }
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                tracing::error!(thread_id, reason = %reason, "conversation pipeline panicked");
                ChatResult::Failure {
                    kind: FailureKind::Internal,
                    detail: "internal server error".into(),
                }
            }
        }
    }

    async fn run(&self, thread_id: &str, author: &str, message: &str) -> Result<ChatResult, PipelineError> {
        if message.trim().is_empty() {
            return Err(PipelineError::Validation("Message is empty.".into()));
        }

        if self.classifier.is_unclear(message) {
            tracing::debug!(thread_id, "message too vague, asking for clarification");
            return Ok(ChatResult::Clarify {
                text: CLARIFICATION_PROMPT.into(),
            });
        }

        let thread = self.threads.thread(thread_id);

        let user_turn = thread.write().await.add(author, message);
        if let Err(e) = self.store.put(&user_turn).await {
            tracing::warn!(thread_id, error = %e, "failed to persist user turn, continuing in memory");
        }

        let recalled = match self.store.query_similar(message, self.recall_top_k).await {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "semantic recall failed, continuing without it");
                Vec::new()
            }
        };

        let prompt = fuse(&recalled, message);

        let response = self
            .model
            .complete(&prompt)
            .await
            .map_err(PipelineError::Model)?;

        let (prior_context, assistant_turn) = {
            let mut memory = thread.write().await;
            let snapshot = memory.get_messages();
            (snapshot, memory.add(ASSISTANT_AUTHOR, &response))
        };
        if let Err(e) = self.store.put(&assistant_turn).await {
            tracing::warn!(thread_id, error = %e, "failed to persist assistant turn");
        }

        tracing::info!(
            thread_id,
            recalled = recalled.len(),
            prompt_len = prompt.len(),
            "answered message"
        );

        Ok(ChatResult::Answer {
            prior_context,
            response,
        })
    }

    /// Snapshot of the default thread.
    pub async fn memory_snapshot(&self) -> Vec<Turn> {
        self.memory_snapshot_of(DEFAULT_THREAD).await
    }

    /// Snapshot of the named thread; empty if it has never been used.
    pub async fn memory_snapshot_of(&self, thread_id: &str) -> Vec<Turn> {
        match self.threads.existing(thread_id) {
            Some(thread) => thread.read().await.get_messages(),
            None => Vec::new(),
        }
    }

    /// Empty the default thread.
    pub async fn clear_memory(&self) {
        self.clear_memory_of(DEFAULT_THREAD).await;
    }

    /// Empty the named thread and release its registry entry.
    pub async fn clear_memory_of(&self, thread_id: &str) {
        if let Some(thread) = self.threads.remove(thread_id) {
            thread.write().await.clear();
            tracing::info!(thread_id, "thread memory cleared");
        }
    }

    /// Number of thread buffers currently held in memory.
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }
}
