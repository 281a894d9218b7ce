//! Search trait for polymorphic search implementations.
//!
//! This module defines the common `Search` trait that all search strategies
//! (vector, text, regex scan) implement, plus the hit type they all produce.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

use crate::model::Solution;

/// The strategy that produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Vector,
    Text,
    Hybrid,
    Regex,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Vector => "vector",
            SearchType::Text => "text",
            SearchType::Hybrid => "hybrid",
            SearchType::Regex => "regex",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored search result.
///
/// `combined_score` is the cross-strategy score every hit is ranked by;
/// the raw per-strategy scores stay available for display and merging.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub solution: Solution,
    /// Strategy this hit is attributed to. Becomes `Hybrid` once a merge
    /// combines evidence from more than one strategy.
    pub search_type: SearchType,
    /// Raw vector similarity, when vector search surfaced this hit.
    pub vector_score: Option<f32>,
    /// Raw lexical score, when a text strategy surfaced this hit.
    pub text_score: Option<f32>,
    /// Normalized score comparable across strategies.
    pub combined_score: f32,
    /// Every strategy that surfaced this hit, in order of arrival.
    pub sources: Vec<SearchType>,
}

/// Common trait for all search strategies.
#[async_trait]
pub trait Search: Send + Sync {
    /// Search for relevant solutions.
    ///
    /// Returns hits sorted by relevance (highest combined score first).
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Get the search type identifier.
    fn search_type(&self) -> SearchType;
}
