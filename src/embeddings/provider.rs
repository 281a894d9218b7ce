use anyhow::Result;
use async_trait::async_trait;

/// Core trait for embedding providers.
///
/// An `Ok` result carrying an empty vector means the provider could not embed
/// this input; callers treat that as a soft failure, not an error.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a document at save or backfill time.
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate an embedding for a search query (may have special optimization).
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>>;

    /// Get the dimension of embeddings produced by this provider.
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model, recorded in search metadata.
    fn model_id(&self) -> &str;

    /// Get provider name for logging and metrics.
    fn provider_name(&self) -> &'static str;
}
