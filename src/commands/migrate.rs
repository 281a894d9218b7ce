//! Migrate command backfilling embeddings for records stored without one.

use anyhow::{bail, Result};

use crate::embeddings::create_provider;
use crate::migrate::BackfillDriver;

pub async fn run(batch_size: Option<usize>, max_documents: Option<usize>) -> Result<()> {
    let (root, config) = super::require_initialized()?;

    let provider = match create_provider(&config.embeddings)? {
        Some(provider) => provider,
        None => bail!(
            "Embeddings are disabled.\n\
             Enable a provider in .solsearch/config.toml before backfilling."
        ),
    };

    let store = super::open_store(&root, &config).await?;

    let driver = BackfillDriver::new(store, provider)
        .with_batch_size(batch_size.unwrap_or(config.migration.batch_size))
        .with_max_documents(max_documents.unwrap_or(config.migration.max_documents));

    let report = driver.run().await?;
    report.print_summary();

    Ok(())
}
