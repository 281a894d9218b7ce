//! Search command over the solution store.

use std::str::FromStr;

use anyhow::Result;

use crate::config::SearchMode;
use crate::embeddings::create_provider;
use crate::search::HybridRetriever;

pub async fn run(query: &str, limit: Option<usize>, mode: Option<&str>) -> Result<()> {
    let (root, config) = super::require_initialized()?;

    let limit = limit.unwrap_or(config.search.default_limit);
    let mode = match mode {
        Some(raw) => SearchMode::from_str(raw)?,
        None => config.search.mode,
    };

    // Text and regex searches never consult the embedding provider, so skip
    // model setup entirely for those modes.
    let provider = if matches!(
        mode,
        SearchMode::Auto | SearchMode::Vector | SearchMode::Hybrid
    ) {
        create_provider(&config.embeddings)?
    } else {
        None
    };

    let store = super::open_store(&root, &config).await?;
    let retriever = HybridRetriever::new(store.clone(), provider);

    let hits = retriever.search(query, limit, mode).await;

    if hits.is_empty() {
        println!("No results found for: {}", query);
        println!("\nStore solutions with 'solsearch add <file.json>' before searching");
        return Ok(());
    }

    println!("Found {} results for: \"{}\"\n", hits.len(), query);

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} [{}] (score: {:.2})",
            i + 1,
            hit.solution.domain,
            hit.search_type,
            hit.combined_score
        );
        println!("   id: {}", hit.solution.id);

        let ratings = store.rating_summary(&hit.solution.id).await?;
        if ratings.count > 0 {
            println!("   rated {:.1}/5 over {} ratings", ratings.average, ratings.count);
        }

        // Print the summary preview (first few lines)
        println!("{}", format_preview(&hit.solution.summary, 5));
        println!();
    }

    Ok(())
}

/// Format a preview of the content, limiting to max_lines
fn format_preview(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let preview_lines = if lines.len() > max_lines {
        let mut preview: Vec<&str> = lines.iter().take(max_lines).copied().collect();
        preview.push("   ...");
        preview
    } else {
        lines
    };

    preview_lines
        .iter()
        .map(|line| format!("   {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
