//! Search module providing vector, text, hybrid and scan-based retrieval.
//!
//! This module contains:
//! - `traits` - Common `Search` trait and the `SearchHit` result type
//! - `scoring` - Lexical relevance scoring and cross-strategy merging
//! - `vector` - Semantic vector search using embeddings
//! - `text` - Keyword search backed by the Tantivy index
//! - `regex_scan` - Literal substring scan used as the last fallback
//! - `orchestrator` - The fallback chain tying the strategies together

mod orchestrator;
mod regex_scan;
mod scoring;
mod text;
pub mod traits;
mod vector;

// Re-export commonly used types
pub use orchestrator::HybridRetriever;
pub use regex_scan::RegexScan;
pub use scoring::{lexical_score, merge_hybrid};
pub use text::TextSearch;
pub use traits::{Search, SearchHit, SearchType};
pub use vector::VectorSearch;
