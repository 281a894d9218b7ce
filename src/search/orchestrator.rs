//! Fallback orchestration across the search strategies.
//!
//! One entry point tries the strategies in order of quality: vector
//! similarity, then a hybrid vector-plus-text merge, then the lexical
//! index, then the regex scan. A stage that errors or comes back empty
//! hands over to the next; the caller always gets a plain list, possibly
//! empty, never an error.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::scoring::merge_hybrid;
use super::traits::{Search, SearchHit};
use super::{RegexScan, TextSearch, VectorSearch};
use crate::config::SearchMode;
use crate::embeddings::EmbeddingProvider;
use crate::metrics::{SEARCH_LATENCY, SEARCH_REQUESTS, SEARCH_RESULTS};
use crate::store::{SolutionStore, StoreError};

/// Queries shorter than this (after trimming) return nothing at all.
const MIN_QUERY_CHARS: usize = 2;

/// Entry point for all searches.
pub struct HybridRetriever {
    /// Absent when no embedding provider is configured; the chain then
    /// starts at the text stage.
    vector: Option<VectorSearch>,
    text: TextSearch,
    scan: RegexScan,
}

impl HybridRetriever {
    pub fn new(store: Arc<SolutionStore>, provider: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        let vector = provider.map(|p| VectorSearch::new(store.clone(), p));
        Self {
            vector,
            text: TextSearch::new(store.clone()),
            scan: RegexScan::new(store),
        }
    }

    /// Run a search in the requested mode.
    ///
    /// Degrades instead of failing: stage errors are logged and absorbed,
    /// and an exhausted chain yields an empty list.
    pub async fn search(&self, query: &str, limit: usize, mode: SearchMode) -> Vec<SearchHit> {
        let start = Instant::now();

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            debug!(query = query, "Query too short, returning no results");
            return Vec::new();
        }
        let limit = limit.max(1);

        SEARCH_REQUESTS.inc();

        let hits = match mode {
            SearchMode::Auto => self.run_chain(trimmed, limit).await,
            SearchMode::Vector => match &self.vector {
                Some(vector) => run_stage(vector, trimmed, limit).await,
                None => {
                    info!("Vector search requested but no embedding provider is configured");
                    Vec::new()
                }
            },
            SearchMode::Text => run_stage(&self.text, trimmed, limit).await,
            SearchMode::Hybrid => self.run_hybrid(trimmed, limit).await,
            SearchMode::Regex => run_stage(&self.scan, trimmed, limit).await,
        };

        let elapsed = start.elapsed();
        SEARCH_LATENCY.observe(elapsed.as_secs_f64());
        SEARCH_RESULTS.observe(hits.len() as f64);

        info!(
            query = trimmed,
            mode = %mode,
            results = hits.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Search completed"
        );

        hits
    }

    async fn run_chain(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        if let Some(vector) = &self.vector {
            let hits = run_stage(vector, query, limit).await;
            if !hits.is_empty() {
                return hits;
            }
            debug!(query = query, "Vector stage empty, trying hybrid merge");

            let hits = self.run_hybrid(query, limit).await;
            if !hits.is_empty() {
                return hits;
            }
        }

        let hits = run_stage(&self.text, query, limit).await;
        if !hits.is_empty() {
            return hits;
        }
        debug!(query = query, "Text stage empty, falling back to regex scan");

        run_stage(&self.scan, query, limit).await
    }

    /// Split the result limit between the vector and text stages and merge.
    ///
    /// The stages run sequentially: the text share depends on how many
    /// vector hits actually came back.
    async fn run_hybrid(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let Some(vector) = &self.vector else {
            return run_stage(&self.text, query, limit).await;
        };

        let vector_limit = limit / 2;
        let vector_hits = if vector_limit == 0 {
            Vec::new()
        } else {
            run_stage(vector, query, vector_limit).await
        };

        let text_limit = limit.saturating_sub(vector_hits.len());
        let text_hits = if text_limit == 0 {
            Vec::new()
        } else {
            run_stage(&self.text, query, text_limit).await
        };

        merge_hybrid(vector_hits, text_hits, limit)
    }
}

/// Run one stage, absorbing its failure into an empty result.
///
/// A missing capability (`IndexNotConfigured`) is expected in some
/// deployments and only worth an info line; anything else is a warning.
async fn run_stage(stage: &dyn Search, query: &str, limit: usize) -> Vec<SearchHit> {
    match stage.search(query, limit).await {
        Ok(hits) => hits,
        Err(e) => {
            match e.downcast_ref::<StoreError>() {
                Some(StoreError::IndexNotConfigured { kind }) => {
                    info!(
                        stage = %stage.search_type(),
                        kind = kind,
                        "Search capability not configured, falling through"
                    );
                }
                _ => {
                    warn!(
                        stage = %stage.search_type(),
                        error = %e,
                        "Search stage failed, falling through"
                    );
                }
            }
            Vec::new()
        }
    }
}
