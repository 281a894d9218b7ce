use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::provider::EmbeddingProvider;
use crate::config::EmbeddingsConfig;
use crate::metrics::{EMBEDDING_LATENCY, EMBEDDING_REQUESTS};

/// Local embedding provider backed by fastembed ONNX models.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
}

impl FastEmbedProvider {
    /// Create a new FastEmbedProvider with the configured model.
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let model_type = parse_model_name(&config.model);

        info!("Loading embedding model: {}", config.model);

        let model =
            TextEmbedding::try_new(InitOptions::new(model_type).with_show_download_progress(true))
                .with_context(|| {
                    format!("Failed to initialize embedding model: {}", config.model)
                })?;

        info!("Embedding model loaded successfully");

        Ok(Self {
            model: Arc::new(model),
            model_name: config.model.clone(),
        })
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        EMBEDDING_REQUESTS.inc();
        let start = Instant::now();

        // Wrap synchronous fastembed in async using spawn_blocking
        let model = self.model.clone();
        let text = text.to_string();

        let mut embeddings = tokio::task::spawn_blocking(move || {
            model
                .embed(vec![text.as_str()], None)
                .with_context(|| "Failed to generate embeddings")
        })
        .await
        .context("FastEmbed processing task failed")??;

        EMBEDDING_LATENCY.observe(start.elapsed().as_secs_f64());

        embeddings
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No embedding generated"))
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_one(text).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed_one(query).await
    }

    fn dimension(&self) -> usize {
        fastembed_dimension(&self.model_name)
    }

    fn model_id(&self) -> &str {
        &self.model_name
    }

    fn provider_name(&self) -> &'static str {
        "fastembed"
    }
}

/// Parse model name string to fastembed EmbeddingModel enum.
fn parse_model_name(name: &str) -> EmbeddingModel {
    match name {
        "nomic-embed-text-v1.5" | "nomic-embed-text" | "nomic-ai/nomic-embed-text-v1.5" => {
            EmbeddingModel::NomicEmbedTextV15
        }
        "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
        "bge-small-en-v1.5" | "bge-small" | "BAAI/bge-small-en-v1.5" => {
            EmbeddingModel::BGESmallENV15
        }
        "bge-base-en-v1.5" | "bge-base" | "BAAI/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "bge-large-en-v1.5" | "bge-large" | "BAAI/bge-large-en-v1.5" => {
            EmbeddingModel::BGELargeENV15
        }
        _ => {
            warn!(
                "Unknown model '{}', falling back to nomic-embed-text-v1.5",
                name
            );
            EmbeddingModel::NomicEmbedTextV15
        }
    }
}

/// Embedding dimension for a fastembed model, resolvable without loading it.
pub fn fastembed_dimension(model_name: &str) -> usize {
    match model_name {
        name if name.contains("bge-small") => 384,
        name if name.contains("bge-base") => 768,
        name if name.contains("bge-large") => 1024,
        name if name.contains("nomic") => 768,
        name if name.contains("MiniLM") || name.contains("minilm") => 384,
        _ => 768, // Default
    }
}
