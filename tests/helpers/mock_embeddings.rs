use anyhow::{anyhow, Result};
use async_trait::async_trait;

use solsearch::embeddings::mock::MockEmbedder;
use solsearch::embeddings::EmbeddingProvider;

/// Provider that fails for any document containing `trigger`.
///
/// Lets backfill tests mix failing and succeeding records in a single run.
pub struct FlakyEmbedder {
    inner: MockEmbedder,
    trigger: String,
}

impl FlakyEmbedder {
    pub fn new(dimension: usize, trigger: &str) -> Self {
        Self {
            inner: MockEmbedder::new(dimension),
            trigger: trigger.to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains(&self.trigger) {
            return Err(anyhow!("rate limit exceeded"));
        }
        self.inner.embed_document(text).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.inner.embed_query(query).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        "flaky-embedder"
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
