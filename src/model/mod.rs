//! Domain types for solution records and their ratings.

mod rating;
mod solution;

pub use rating::{Rating, RatingSummary, MAX_RATING, MIN_RATING};
pub use solution::{
    SearchMetadata, Solution, SolutionDraft, SolutionStatus, MIN_BODY_LEN, VERSION_LEXICAL,
    VERSION_VECTOR,
};

use thiserror::Error;

/// Rejections raised before any store access is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("domain is required")]
    MissingDomain,

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("rating must be between 1 and 5, got {score}")]
    RatingOutOfRange { score: u8 },
}
