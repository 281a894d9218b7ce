use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A single user rating for a solution. Append-only: ratings are never
/// updated or deleted, and one user may rate the same solution repeatedly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: String,
    pub solution_id: String,
    pub score: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        solution_id: &str,
        score: u8,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Self::validate_score(score)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            solution_id: solution_id.to_string(),
            score,
            comment: comment.unwrap_or("").trim().to_string(),
            created_at: now,
        })
    }

    pub fn validate_score(score: u8) -> Result<(), ValidationError> {
        if !(MIN_RATING..=MAX_RATING).contains(&score) {
            return Err(ValidationError::RatingOutOfRange { score });
        }
        Ok(())
    }
}

/// On-demand aggregate over all ratings of one solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean score rounded to one decimal place; 0.0 when there are no ratings.
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    pub fn from_scores(scores: &[u8]) -> Self {
        if scores.is_empty() {
            return Self {
                average: 0.0,
                count: 0,
            };
        }
        let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
        let mean = sum as f64 / scores.len() as f64;
        Self {
            average: (mean * 10.0).round() / 10.0,
            count: scores.len(),
        }
    }
}
