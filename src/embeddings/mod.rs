//! Embedding generation for solution records and queries.

pub mod input;
pub mod mock;

mod fastembed_provider;
mod openai_provider;
mod provider;

pub use fastembed_provider::FastEmbedProvider;
pub use openai_provider::OpenAIProvider;
pub use provider::EmbeddingProvider;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::{EmbeddingsConfig, ProviderKind};

/// Instantiate the configured embedding provider.
///
/// Returns `None` when embeddings are disabled; search then runs on its
/// lexical stages alone.
pub fn create_provider(config: &EmbeddingsConfig) -> Result<Option<Arc<dyn EmbeddingProvider>>> {
    match config.provider {
        ProviderKind::Disabled => {
            info!("Embeddings disabled by configuration");
            Ok(None)
        }
        ProviderKind::FastEmbed => {
            let provider: Arc<dyn EmbeddingProvider> = Arc::new(FastEmbedProvider::new(config)?);
            Ok(Some(provider))
        }
        ProviderKind::OpenAI => {
            let provider: Arc<dyn EmbeddingProvider> = Arc::new(OpenAIProvider::new(config)?);
            Ok(Some(provider))
        }
    }
}

/// Embedding dimension implied by the configuration, without loading a model.
///
/// The store schema needs this even for commands that never embed anything.
pub fn model_dimension(config: &EmbeddingsConfig) -> usize {
    match config.provider {
        ProviderKind::OpenAI => openai_provider::openai_dimension(&config.openai_model),
        _ => fastembed_provider::fastembed_dimension(&config.model),
    }
}
