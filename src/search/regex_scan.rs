//! Last-resort substring scan over all active solutions.
//!
//! No index involved: the query is treated as a literal, matched
//! case-insensitively against the descriptive fields of every active
//! record. Slow but dependency-free, which is exactly what the end of the
//! fallback chain needs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::scoring::lexical_score;
use super::traits::{Search, SearchHit, SearchType};
use crate::model::Solution;
use crate::store::SolutionStore;

pub struct RegexScan {
    store: Arc<SolutionStore>,
}

impl RegexScan {
    pub fn new(store: Arc<SolutionStore>) -> Self {
        Self { store }
    }
}

pub(crate) fn matches_any_field(pattern: &Regex, solution: &Solution) -> bool {
    pattern.is_match(&solution.summary)
        || pattern.is_match(&solution.domain)
        || pattern.is_match(&solution.extra_info)
        || pattern.is_match(&solution.script)
}

#[async_trait]
impl Search for RegexScan {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let start = Instant::now();

        // Escape so user input is always a literal, never a pattern.
        let pattern = RegexBuilder::new(&regex::escape(query.trim()))
            .case_insensitive(true)
            .build()
            .context("Failed to build scan pattern")?;

        let solutions = self.store.scan_active().await?;
        let scanned = solutions.len();

        let now = Utc::now();
        let mut hits: Vec<SearchHit> = solutions
            .into_iter()
            .filter(|solution| matches_any_field(&pattern, solution))
            .map(|solution| {
                let score = lexical_score(query, &solution, now);
                SearchHit::from_scan_score(solution, score)
            })
            .collect();

        hits.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        let elapsed = start.elapsed();
        info!(
            search_type = "regex",
            query = query,
            scanned = scanned,
            results = hits.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Regex scan completed"
        );

        Ok(hits)
    }

    fn search_type(&self) -> SearchType {
        SearchType::Regex
    }
}
