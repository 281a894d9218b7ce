//! Recent command listing the newest stored solutions.

use anyhow::Result;

pub async fn run(limit: usize) -> Result<()> {
    let (root, config) = super::require_initialized()?;
    let store = super::open_store(&root, &config).await?;

    let solutions = store.recent(limit).await?;

    if solutions.is_empty() {
        println!("No solutions stored yet.");
        println!("\nStore one with 'solsearch add <file.json>'");
        return Ok(());
    }

    println!("Most recent solutions:\n");
    for (i, solution) in solutions.iter().enumerate() {
        println!(
            "{}. {} ({})",
            i + 1,
            solution.domain,
            solution.created_at.format("%Y-%m-%d %H:%M")
        );
        println!("   id: {}", solution.id);
        let first_line = solution.summary.lines().next().unwrap_or("");
        println!("   {}", first_line);
        println!();
    }

    Ok(())
}
