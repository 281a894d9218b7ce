use anyhow::{bail, Result};
use std::env;
use tracing::info;

use crate::Config;

pub async fn run(force: bool) -> Result<()> {
    let root = env::current_dir()?;

    if Config::is_initialized(&root) && !force {
        bail!(
            "solsearch is already initialized in {:?}. Use --force to overwrite the configuration.",
            Config::solsearch_dir(&root)
        );
    }

    let config = Config::default();
    config.save(&root)?;

    info!(
        "Initialized solsearch in {:?}",
        Config::solsearch_dir(&root)
    );
    println!(
        "✓ Created {} with default configuration",
        Config::solsearch_dir(&root).display()
    );
    println!("\nNext steps:");
    println!("  1. Edit .solsearch/config.toml to customize settings");
    println!("  2. Run 'solsearch add <file.json>' to store a solution record");
    println!("  3. Run 'solsearch search \"query\"' to find stored solutions");

    Ok(())
}
