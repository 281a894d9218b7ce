//! Persistence layer: LanceDB tables plus the optional Tantivy text index.

mod error;
mod ratings;
mod solutions;
mod text_index;

pub use error::{SaveError, StoreError};
pub use solutions::{DatabaseStats, SolutionStore, MAX_EMBEDDING_ATTEMPTS};
pub use text_index::{TextHit, TextIndex};
