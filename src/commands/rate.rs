//! Rate command for recording feedback on a stored solution.

use anyhow::{bail, Result};
use tracing::info;

use crate::store::{SaveError, StoreError};

pub async fn run(id: &str, score: u8, comment: Option<&str>) -> Result<()> {
    let (root, config) = super::require_initialized()?;
    let store = super::open_store(&root, &config).await?;

    let rating = match store.add_rating(id, score, comment).await {
        Ok(rating) => rating,
        Err(SaveError::Invalid(err)) => bail!("Rating rejected: {}", err),
        Err(SaveError::Store(StoreError::NotFound { id })) => {
            bail!("No solution with id {}", id)
        }
        Err(SaveError::Store(err)) => return Err(err.into()),
    };

    info!(solution_id = %rating.solution_id, score = rating.score, "Recorded rating");

    let summary = store.rating_summary(id).await?;
    println!("✓ Rated solution {} with {}/5", id, score);
    println!(
        "  Now rated {:.1}/5 over {} ratings",
        summary.average, summary.count
    );

    Ok(())
}
