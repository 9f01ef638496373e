//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and [`TransformersEmbeddingProvider`], an HTTP
//! client for a text2vec-transformers style inference service. Vectors are L2-normalized
//! so nearest-neighbour distance orders by cosine similarity.

pub mod transformers;

use anyhow::Result;
use async_trait::async_trait;

pub use transformers::TransformersEmbeddingProvider;

/// Trait for embedding text into vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Number of dimensions this provider produces.
    fn dimensions(&self) -> usize;

    /// Identifier recorded alongside stored vectors.
    fn model_id(&self) -> &str;
}

/// Create the embedding provider described by config.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    let provider = TransformersEmbeddingProvider::new(config)?;
    Ok(Box::new(provider))
}

/// L2-normalize a vector. Returns the input unchanged if its norm is zero.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
