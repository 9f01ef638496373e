//! HTTP embedding provider for a text2vec-transformers inference container.
//!
//! Sends `POST {url}/vectors` with `{"text": ...}` and reads `{"vector": [...]}` back.
//! Vector length is checked by the store against [`EmbeddingProvider::dimensions`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{l2_normalize, EmbeddingProvider};
use crate::config::EmbeddingConfig;

pub struct TransformersEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct VectorizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct VectorizeResponse {
    vector: Vec<f32>,
}

impl TransformersEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        anyhow::ensure!(config.dimensions > 0, "embedding dimensions must be positive");

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build embedding HTTP client")?;

        let endpoint = format!("{}/vectors", config.url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, model = %config.model, "embedding provider configured");

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for TransformersEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VectorizeRequest { text })
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {}", self.endpoint))?;

        anyhow::ensure!(
            response.status().is_success(),
            "vectorizer returned HTTP {}",
            response.status()
        );

        let body: VectorizeResponse = response
            .json()
            .await
            .context("failed to parse vectorizer response")?;

        Ok(l2_normalize(&body.vector))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
