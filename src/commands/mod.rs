//! CLI command implementations.

pub mod add;
pub mod init;
pub mod migrate;
pub mod rate;
pub mod recent;
pub mod search;
pub mod stats;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::embeddings;
use crate::store::SolutionStore;

/// Resolve the working directory and load its configuration, failing when
/// solsearch has not been initialized there.
pub(crate) fn require_initialized() -> Result<(PathBuf, Config)> {
    let root = env::current_dir().context("Failed to get current directory")?;

    if !Config::is_initialized(&root) {
        bail!("solsearch is not initialized. Run 'solsearch init' first.");
    }

    let config = Config::load(&root)?;
    Ok((root, config))
}

/// Open the solution store described by `config`, rooted at `root`.
pub(crate) async fn open_store(root: &Path, config: &Config) -> Result<Arc<SolutionStore>> {
    let dimension = embeddings::model_dimension(&config.embeddings);
    let solsearch_dir = Config::solsearch_dir(root);
    let text_path = config.storage.text_index.then(|| solsearch_dir.as_path());

    let store = SolutionStore::open(&config.db_path(root), dimension, text_path).await?;
    Ok(Arc::new(store))
}
