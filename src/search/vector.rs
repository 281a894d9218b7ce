//! Vector similarity search over stored solution embeddings.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::traits::{Search, SearchHit, SearchType};
use crate::embeddings::EmbeddingProvider;
use crate::store::SolutionStore;

/// Candidates fetched per requested result. The engine applies the status
/// and embedding filters before ranking, so the over-fetch keeps the final
/// page full even when many candidates drop out.
const OVERFETCH_FACTOR: usize = 10;

/// Semantic search: embed the query, rank stored embeddings by similarity.
pub struct VectorSearch {
    store: Arc<SolutionStore>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl VectorSearch {
    pub fn new(store: Arc<SolutionStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, provider }
    }
}

#[async_trait]
impl Search for VectorSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let start = Instant::now();

        let vector = self
            .provider
            .embed_query(query)
            .await
            .context("Failed to embed query")?;

        if vector.is_empty() {
            warn!(
                query = query,
                "Provider returned an empty query embedding, skipping vector search"
            );
            return Ok(Vec::new());
        }

        let candidates = self
            .store
            .vector_search(vector, limit * OVERFETCH_FACTOR)
            .await?;

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .map(|(solution, similarity)| SearchHit::from_vector_score(solution, similarity))
            .collect();

        hits.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        let elapsed = start.elapsed();
        info!(
            search_type = "vector",
            query = query,
            results = hits.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Vector search completed"
        );

        Ok(hits)
    }

    fn search_type(&self) -> SearchType {
        SearchType::Vector
    }
}
