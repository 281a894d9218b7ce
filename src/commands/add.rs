//! Add command for storing a solution record from a JSON draft file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::embeddings::create_provider;
use crate::model::SolutionDraft;
use crate::store::SaveError;

pub async fn run(file: &Path) -> Result<()> {
    let (root, config) = super::require_initialized()?;

    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read draft file {}", file.display()))?;
    let draft: SolutionDraft = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {} as a solution draft", file.display()))?;

    let provider = create_provider(&config.embeddings)?;
    let store = super::open_store(&root, &config).await?;

    let solution = match store.save(draft, provider.as_deref()).await {
        Ok(solution) => solution,
        Err(SaveError::Invalid(err)) => bail!("Draft rejected: {}", err),
        Err(SaveError::Store(err)) => return Err(err.into()),
    };

    info!(id = %solution.id, domain = %solution.domain, "Stored solution");

    println!("✓ Stored solution {}", solution.id);
    println!("  Domain: {}", solution.domain);
    if solution.search_metadata.has_embedding {
        println!(
            "  Embedding: ready ({})",
            solution
                .search_metadata
                .embedding_model
                .as_deref()
                .unwrap_or("unknown model")
        );
    } else {
        println!("  Embedding: missing (run 'solsearch migrate' to backfill)");
    }

    Ok(())
}
