//! Lexical search backed by the Tantivy index.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::traits::{Search, SearchHit, SearchType};
use crate::store::SolutionStore;

/// Keyword search over the indexed text fields.
///
/// Fails with `StoreError::IndexNotConfigured` when the store runs without
/// a text index; the orchestrator treats that as a missing capability.
pub struct TextSearch {
    store: Arc<SolutionStore>,
}

impl TextSearch {
    pub fn new(store: Arc<SolutionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Search for TextSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let start = Instant::now();

        let matches = self.store.text_search(query, limit).await?;

        // Tantivy already ranks by score; keep its order.
        let hits: Vec<SearchHit> = matches
            .into_iter()
            .map(|(solution, score)| SearchHit::from_text_score(solution, score))
            .collect();

        let elapsed = start.elapsed();
        info!(
            search_type = "text",
            query = query,
            results = hits.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Text search completed"
        );

        Ok(hits)
    }

    fn search_type(&self) -> SearchType {
        SearchType::Text
    }
}
