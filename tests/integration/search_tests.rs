use anyhow::Result;
use std::sync::Arc;

use solsearch::config::SearchMode;
use solsearch::embeddings::mock::MockEmbedder;
use solsearch::embeddings::EmbeddingProvider;
use solsearch::search::{HybridRetriever, SearchType};

use crate::helpers::test_harness::{draft, TestHarness, TEST_DIMENSION};

fn mock_provider() -> Arc<dyn EmbeddingProvider> {
    Arc::new(MockEmbedder::new(TEST_DIMENSION))
}

#[tokio::test]
async fn test_search_degrades_to_scan_without_operators() -> Result<()> {
    // No text index and no provider: the only remaining strategy is the
    // regex scan, which must still produce ranked results.
    let harness = TestHarness::without_text_index().await?;
    harness
        .store
        .save(
            draft(
                "Finance",
                "Reconcile supplier invoices against the general ledger nightly",
            ),
            None,
        )
        .await?;

    let retriever = HybridRetriever::new(harness.store.clone(), None);
    let hits = retriever.search("ledger", 5, SearchMode::Auto).await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].search_type, SearchType::Regex);
    assert!(hits[0].combined_score > 0.0);

    Ok(())
}

#[tokio::test]
async fn test_short_query_returns_empty() -> Result<()> {
    let harness = TestHarness::new().await?;
    harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    let retriever = HybridRetriever::new(harness.store.clone(), None);
    assert!(retriever.search("x", 5, SearchMode::Auto).await.is_empty());
    assert!(retriever.search("  ", 5, SearchMode::Auto).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_text_mode_tags_and_weights_hits() -> Result<()> {
    let harness = TestHarness::new().await?;
    harness
        .store
        .save(
            draft(
                "Finance",
                "Reconcile supplier invoices against the general ledger nightly",
            ),
            None,
        )
        .await?;

    let retriever = HybridRetriever::new(harness.store.clone(), None);
    let hits = retriever.search("invoices", 5, SearchMode::Text).await;

    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit.search_type, SearchType::Text);
    assert_eq!(hit.sources, vec![SearchType::Text]);
    let text_score = hit.text_score.expect("text hits carry a text score");
    assert!((hit.combined_score - text_score * 0.8).abs() < 1e-5);
    assert!(hit.vector_score.is_none());

    Ok(())
}

#[tokio::test]
async fn test_scan_ranks_domain_match_above_body_match() -> Result<()> {
    let harness = TestHarness::new().await?;

    let domain_match = harness
        .store
        .save(
            draft(
                "Finance",
                "Close the books at month end with a scripted checklist run",
            ),
            None,
        )
        .await?;
    let body_match = harness
        .store
        .save(
            draft(
                "Operations",
                "Collect branch reports and forward them for finance review",
            ),
            None,
        )
        .await?;

    let retriever = HybridRetriever::new(harness.store.clone(), None);
    let hits = retriever.search("finance", 5, SearchMode::Regex).await;

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].solution.id, domain_match.id);
    assert_eq!(hits[1].solution.id, body_match.id);
    assert!(hits[0].combined_score > hits[1].combined_score);
    assert!(hits.iter().all(|h| h.search_type == SearchType::Regex));

    Ok(())
}

#[tokio::test]
async fn test_vector_mode_scores_stay_within_cap() -> Result<()> {
    let harness = TestHarness::new().await?;
    let embedder = MockEmbedder::new(TEST_DIMENSION);

    for summary in [
        "Reconcile supplier invoices against the general ledger nightly",
        "Rotate on-call schedules for the radiology department weekly",
        "Rebalance store inventory between regional warehouses on demand",
    ] {
        harness
            .store
            .save(draft("Mixed", summary), Some(&embedder))
            .await?;
    }

    let retriever = HybridRetriever::new(harness.store.clone(), Some(mock_provider()));
    let hits = retriever
        .search("ledger reconciliation", 10, SearchMode::Vector)
        .await;

    assert_eq!(hits.len(), 3);
    for hit in &hits {
        assert_eq!(hit.search_type, SearchType::Vector);
        assert!(hit.vector_score.is_some());
        assert!(hit.combined_score > 0.0);
        assert!(hit.combined_score <= 10.0);
    }
    for pair in hits.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
    }

    Ok(())
}

#[tokio::test]
async fn test_vector_mode_without_provider_is_empty() -> Result<()> {
    let harness = TestHarness::new().await?;
    harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    let retriever = HybridRetriever::new(harness.store.clone(), None);
    let hits = retriever.search("ledger", 5, SearchMode::Vector).await;

    assert!(hits.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_auto_uses_vector_when_available() -> Result<()> {
    let harness = TestHarness::new().await?;
    let embedder = MockEmbedder::new(TEST_DIMENSION);

    harness
        .store
        .save(
            draft(
                "Finance",
                "Reconcile supplier invoices against the general ledger nightly",
            ),
            Some(&embedder),
        )
        .await?;

    let retriever = HybridRetriever::new(harness.store.clone(), Some(mock_provider()));
    let hits = retriever.search("ledger close", 5, SearchMode::Auto).await;

    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.search_type == SearchType::Vector));

    Ok(())
}

#[tokio::test]
async fn test_auto_falls_back_to_text_when_nothing_embedded() -> Result<()> {
    // Provider configured but no record carries an embedding: the vector
    // stage comes back empty and the chain continues into the hybrid merge,
    // where only the text half contributes.
    let harness = TestHarness::new().await?;
    harness
        .store
        .save(
            draft(
                "Finance",
                "Reconcile supplier invoices against the general ledger nightly",
            ),
            None,
        )
        .await?;

    let retriever = HybridRetriever::new(harness.store.clone(), Some(mock_provider()));
    let hits = retriever.search("invoices", 5, SearchMode::Auto).await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].search_type, SearchType::Text);

    Ok(())
}

#[tokio::test]
async fn test_hybrid_mode_merges_and_dedups() -> Result<()> {
    let harness = TestHarness::new().await?;
    let embedder = MockEmbedder::new(TEST_DIMENSION);

    for (domain, summary) in [
        (
            "Finance",
            "Reconcile supplier invoices against the general ledger nightly",
        ),
        (
            "Healthcare",
            "Rotate on-call schedules for the radiology department weekly",
        ),
        (
            "Retail",
            "Rebalance store inventory between regional warehouses on demand",
        ),
    ] {
        harness
            .store
            .save(draft(domain, summary), Some(&embedder))
            .await?;
    }

    let retriever = HybridRetriever::new(harness.store.clone(), Some(mock_provider()));
    let hits = retriever
        .search("ledger invoices", 10, SearchMode::Hybrid)
        .await;

    assert!(!hits.is_empty());

    // Every record appears at most once.
    let mut ids: Vec<&str> = hits.iter().map(|h| h.solution.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), hits.len());

    // The lexical match was also found by the vector half, so it merges into
    // a dual-source hit.
    let merged = hits
        .iter()
        .find(|h| h.sources.len() == 2)
        .expect("expected a dual-source hit");
    assert_eq!(merged.search_type, SearchType::Hybrid);
    assert!(merged.vector_score.is_some());
    assert!(merged.text_score.is_some());

    for pair in hits.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
    }

    Ok(())
}

#[tokio::test]
async fn test_search_on_empty_store_is_empty() -> Result<()> {
    let harness = TestHarness::new().await?;

    let retriever = HybridRetriever::new(harness.store.clone(), Some(mock_provider()));
    let hits = retriever.search("anything at all", 5, SearchMode::Auto).await;

    assert!(hits.is_empty());
    Ok(())
}
