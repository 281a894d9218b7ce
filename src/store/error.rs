//! Error taxonomy for the solution store.
//!
//! `IndexNotConfigured` is deliberately its own variant: the search
//! orchestrator treats it as "capability unavailable" and moves on to the
//! next strategy, while every other variant is an operational failure.

use thiserror::Error;

use crate::model::ValidationError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested native search operator has no index behind it.
    #[error("{kind} index is not configured")]
    IndexNotConfigured { kind: &'static str },

    /// Connection establishment exceeded its bound. Fatal at startup, never
    /// silently retried.
    #[error("timed out opening solution database at {path} after {seconds}s")]
    ConnectTimeout { path: String, seconds: u64 },

    #[error("solution {id} not found")]
    NotFound { id: String },

    #[error("stored batch is missing the {name} column")]
    MissingColumn { name: &'static str },

    #[error("database error: {0}")]
    Lance(#[from] lancedb::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("text index error: {0}")]
    Text(#[from] tantivy::TantivyError),

    #[error("text query error: {0}")]
    TextQuery(#[from] tantivy::query::QueryParserError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of the save path. Validation rejections happen before any store
/// access and carry a human-readable reason for the caller.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
