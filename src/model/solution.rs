use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// Minimum trimmed length for `summary` and `script` before a draft is storable.
pub const MIN_BODY_LEN: usize = 50;

/// Schema marker for records written before vector search existed.
pub const VERSION_LEXICAL: &str = "1.0";

/// Schema marker for vector-capable records.
pub const VERSION_VECTOR: &str = "2.0";

/// A persisted automation record: the summary, script, tests, prerequisites
/// and diagram distilled from one procedure document, plus embedding
/// provenance for search.
///
/// Optional text fields are carried as empty strings; scoring and search treat
/// an absent field and an empty field identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub id: String,
    pub domain: String,
    pub summary: String,
    pub script: String,
    pub unit_tests: String,
    pub prerequisites: String,
    pub block_diagram: String,
    pub extra_info: String,
    /// Present only when embedding generation succeeded at save time or via backfill.
    pub embedding: Option<Vec<f32>>,
    pub search_metadata: SearchMetadata,
    pub status: SolutionStatus,
    pub created_at: DateTime<Utc>,
    pub version: String,
    pub usage_count: u64,
}

impl Solution {
    /// Build a new active record from a validated draft.
    ///
    /// The caller is responsible for attaching an embedding (and the matching
    /// metadata) before or after insert; a fresh record starts without one.
    pub fn from_draft(draft: SolutionDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain: draft.domain.trim().to_string(),
            summary: draft.summary.trim().to_string(),
            script: draft.script,
            unit_tests: draft.unit_tests,
            prerequisites: draft.prerequisites,
            block_diagram: draft.block_diagram,
            extra_info: draft.extra_info,
            embedding: None,
            search_metadata: SearchMetadata::default(),
            status: SolutionStatus::Active,
            created_at: now,
            version: VERSION_LEXICAL.to_string(),
            usage_count: 0,
        }
    }
}

/// Embedding provenance attached to every solution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub has_embedding: bool,
    pub embedding_model: Option<String>,
    pub embedding_timestamp: Option<DateTime<Utc>>,
    /// Diagnostic from the most recent failed generation attempt.
    pub embedding_error: Option<String>,
    /// Failed backfill attempts so far; records are dropped from the backfill
    /// selection once this reaches the driver's cap.
    pub embedding_attempts: u32,
}

/// Lifecycle tag. Only active records are eligible for search and statistics;
/// nothing ever deletes a record, removal is a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionStatus {
    Active,
    Inactive,
}

impl SolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionStatus::Active => "active",
            SolutionStatus::Inactive => "inactive",
        }
    }

    /// Parse a stored status value. Unknown values are treated as inactive so
    /// that a corrupted row drops out of search instead of leaking into it.
    pub fn from_column(value: &str) -> Self {
        match value {
            "active" => SolutionStatus::Active,
            _ => SolutionStatus::Inactive,
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unsaved solution as produced by a generation session.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SolutionDraft {
    pub domain: String,
    pub summary: String,
    pub script: String,
    #[serde(default)]
    pub unit_tests: String,
    #[serde(default)]
    pub prerequisites: String,
    #[serde(default)]
    pub block_diagram: String,
    #[serde(default)]
    pub extra_info: String,
}

impl SolutionDraft {
    /// Check the storability rules: domain present, summary and script each at
    /// least [`MIN_BODY_LEN`] characters after trimming.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.domain.trim().is_empty() {
            return Err(ValidationError::MissingDomain);
        }
        if self.summary.trim().len() < MIN_BODY_LEN {
            return Err(ValidationError::TooShort {
                field: "summary",
                min: MIN_BODY_LEN,
            });
        }
        if self.script.trim().len() < MIN_BODY_LEN {
            return Err(ValidationError::TooShort {
                field: "script",
                min: MIN_BODY_LEN,
            });
        }
        Ok(())
    }
}
