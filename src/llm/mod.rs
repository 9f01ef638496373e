//! Language-model seam.

pub mod openai;

use async_trait::async_trait;

use crate::error::ModelError;

pub use openai::OpenAIModel;

/// Produces a completion for a fully assembled prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// May suspend for the full duration of the provider call.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}
