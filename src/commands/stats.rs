//! Stats command for displaying store statistics and metrics

use anyhow::Result;

use crate::metrics::{gather_metrics, MetricSnapshot, EMBEDDED_SOLUTIONS, STORED_SOLUTIONS};

/// Run the stats command
///
/// Displays collection statistics and runtime metrics.
///
/// # Arguments
/// * `prometheus` - If true, output in Prometheus text format
pub async fn run(prometheus: bool) -> Result<()> {
    let (root, config) = super::require_initialized()?;
    let store = super::open_store(&root, &config).await?;

    let stats = store.stats().await?;

    // Update gauge metrics with current values from the store
    STORED_SOLUTIONS.set(stats.total_solutions as f64);
    EMBEDDED_SOLUTIONS.set(stats.with_embeddings as f64);

    if prometheus {
        print!("{}", gather_metrics());
        return Ok(());
    }

    let snapshot = MetricSnapshot::capture();

    println!("Solution Store Statistics");
    println!("=========================\n");

    println!("Collection:");
    println!("  Total solutions:    {}", stats.total_solutions);
    println!("  Active solutions:   {}", stats.active_solutions);
    println!("  Unique domains:     {}", stats.unique_domains);
    println!("  Total ratings:      {}", stats.total_ratings);
    println!("  Added last 7 days:  {}", stats.recent_solutions);
    println!();

    println!("Embeddings:");
    println!("  With embeddings:     {}", stats.with_embeddings);
    println!("  Without embeddings:  {}", stats.without_embeddings);
    println!("  Vector-search ready: {:.1}%", stats.percentage_ready);
    println!();

    let domains = store.popular_domains(5).await?;
    if !domains.is_empty() {
        println!("Top domains:");
        for (domain, count) in &domains {
            println!("  {:<24} {}", domain, count);
        }
        println!();
    }

    println!("Search Metrics:");
    println!(
        "  Total requests:   {:.0}",
        snapshot.search_requests_total
    );
    if snapshot.search_requests_total > 0.0 {
        println!(
            "  Average latency:  {:.3}s",
            snapshot.search_latency_avg
        );
        println!(
            "  Average results:  {:.1}",
            snapshot.search_results_avg
        );
    }
    println!();

    println!("Embedding Metrics:");
    println!(
        "  Total requests:   {:.0}",
        snapshot.embedding_requests_total
    );
    if snapshot.embedding_requests_total > 0.0 {
        println!(
            "  Average latency:  {:.3}s",
            snapshot.embedding_latency_avg
        );
    }
    println!();

    // Show database path
    println!("Storage:");
    println!("  Database path: {}", config.db_path(&root).display());

    Ok(())
}
