use anyhow::Result;

use solsearch::embeddings::mock::MockEmbedder;
use solsearch::model::{SolutionStatus, ValidationError, VERSION_LEXICAL, VERSION_VECTOR};
use solsearch::store::{SaveError, StoreError};

use crate::helpers::mock_embeddings::FlakyEmbedder;
use crate::helpers::test_harness::{draft, TestHarness, TEST_DIMENSION};

#[tokio::test]
async fn test_save_and_get_round_trip() -> Result<()> {
    let harness = TestHarness::new().await?;

    let mut d = draft(
        "Finance",
        "Reconcile supplier invoices against the general ledger every night",
    );
    d.extra_info = "Requires read access to the ledger export share.".to_string();

    let saved = harness.store.save(d, None).await?;
    let loaded = harness
        .store
        .get(&saved.id)
        .await?
        .expect("saved solution should be readable by id");

    assert_eq!(loaded.id, saved.id);
    assert_eq!(loaded.domain, "Finance");
    assert_eq!(loaded.summary, saved.summary);
    assert_eq!(loaded.script, saved.script);
    assert_eq!(loaded.unit_tests, saved.unit_tests);
    assert_eq!(loaded.prerequisites, saved.prerequisites);
    assert_eq!(loaded.block_diagram, saved.block_diagram);
    assert_eq!(loaded.extra_info, saved.extra_info);
    assert_eq!(loaded.status, SolutionStatus::Active);
    assert_eq!(loaded.version, VERSION_LEXICAL);
    assert_eq!(loaded.usage_count, 0);
    assert!(loaded.embedding.is_none());
    assert!(!loaded.search_metadata.has_embedding);

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_id_is_none() -> Result<()> {
    let harness = TestHarness::new().await?;
    // Store one record so the table exists.
    harness
        .store
        .save(draft("Finance", &"nightly ledger reconciliation ".repeat(3)), None)
        .await?;

    assert!(harness.store.get("no-such-id").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_save_rejects_invalid_draft() -> Result<()> {
    let harness = TestHarness::new().await?;

    let mut d = draft("Finance", "too short to store");
    d.summary = "brief".to_string();

    let err = harness
        .store
        .save(d, None)
        .await
        .expect_err("short summary must be rejected");

    match err {
        SaveError::Invalid(ValidationError::TooShort { field, .. }) => {
            assert_eq!(field, "summary");
        }
        other => panic!("expected validation rejection, got {other:?}"),
    }

    // Nothing was stored.
    let stats = harness.store.stats().await?;
    assert_eq!(stats.total_solutions, 0);

    Ok(())
}

#[tokio::test]
async fn test_save_with_provider_attaches_embedding() -> Result<()> {
    let harness = TestHarness::new().await?;
    let provider = MockEmbedder::new(TEST_DIMENSION);

    let saved = harness
        .store
        .save(
            draft(
                "Healthcare",
                "Export anonymized admission statistics for the weekly review",
            ),
            Some(&provider),
        )
        .await?;

    assert!(saved.search_metadata.has_embedding);
    assert_eq!(
        saved.search_metadata.embedding_model.as_deref(),
        Some("mock-embedder")
    );
    assert!(saved.search_metadata.embedding_timestamp.is_some());
    assert!(saved.search_metadata.embedding_error.is_none());
    assert_eq!(saved.version, VERSION_VECTOR);

    let embedding = saved.embedding.expect("embedding should be attached");
    assert_eq!(embedding.len(), TEST_DIMENSION);

    // The stored row carries the vector too.
    let loaded = harness.store.get(&saved.id).await?.unwrap();
    assert_eq!(loaded.embedding.as_ref().map(Vec::len), Some(TEST_DIMENSION));

    Ok(())
}

#[tokio::test]
async fn test_save_survives_provider_failure() -> Result<()> {
    let harness = TestHarness::new().await?;
    let provider = FlakyEmbedder::new(TEST_DIMENSION, "quarterly");

    let saved = harness
        .store
        .save(
            draft(
                "Finance",
                "Assemble the quarterly compliance filing from branch spreadsheets",
            ),
            Some(&provider),
        )
        .await?;

    // The record is stored lexical-only with the failure recorded.
    assert!(!saved.search_metadata.has_embedding);
    assert!(saved.embedding.is_none());
    assert_eq!(saved.version, VERSION_LEXICAL);
    let error = saved
        .search_metadata
        .embedding_error
        .expect("failure reason should be recorded");
    assert!(error.contains("rate limit"), "got: {error}");

    assert!(harness.store.get(&saved.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_recent_orders_newest_first() -> Result<()> {
    let harness = TestHarness::new().await?;

    for i in 0..4 {
        harness
            .store
            .save(
                draft(
                    &format!("Domain{i}"),
                    &format!("Automation number {i} doing enough work to clear the minimum length"),
                ),
                None,
            )
            .await?;
    }

    let recent = harness.store.recent(3).await?;
    assert_eq!(recent.len(), 3);
    assert!(recent[0].created_at >= recent[1].created_at);
    assert!(recent[1].created_at >= recent[2].created_at);

    Ok(())
}

#[tokio::test]
async fn test_vector_search_orders_by_similarity() -> Result<()> {
    let harness = TestHarness::new().await?;
    let provider = MockEmbedder::new(TEST_DIMENSION);

    let a = harness
        .store
        .save(
            draft(
                "Finance",
                "Reconcile supplier invoices against the ledger export nightly",
            ),
            Some(&provider),
        )
        .await?;
    harness
        .store
        .save(
            draft(
                "Healthcare",
                "Rotate on-call schedules for the radiology department weekly",
            ),
            Some(&provider),
        )
        .await?;

    // Query with record A's own vector; A must come back first with the
    // highest similarity.
    let query = a.embedding.clone().unwrap();
    let results = harness.store.vector_search(query, 2).await?;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.id, a.id);
    assert!(results[0].1 >= results[1].1);
    assert!(results[0].1 > 0.99, "self-similarity should be ~1.0");

    Ok(())
}

#[tokio::test]
async fn test_vector_search_skips_unembedded_records() -> Result<()> {
    let harness = TestHarness::new().await?;
    let provider = MockEmbedder::new(TEST_DIMENSION);

    harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            Some(&provider),
        )
        .await?;
    let lexical_only = harness
        .store
        .save(
            draft("Retail", &"store inventory rebalancing automation ".repeat(3)),
            None,
        )
        .await?;

    let results = harness
        .store
        .vector_search(vec![0.1; TEST_DIMENSION], 10)
        .await?;

    assert_eq!(results.len(), 1);
    assert!(results.iter().all(|(s, _)| s.id != lexical_only.id));

    Ok(())
}

#[tokio::test]
async fn test_text_search_requires_index() -> Result<()> {
    let harness = TestHarness::without_text_index().await?;
    harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    let err = harness
        .store
        .text_search("ledger", 10)
        .await
        .expect_err("text search must fail without an index");

    assert!(matches!(err, StoreError::IndexNotConfigured { .. }));
    Ok(())
}

#[tokio::test]
async fn test_text_search_finds_indexed_summary() -> Result<()> {
    let harness = TestHarness::new().await?;

    let saved = harness
        .store
        .save(
            draft(
                "Finance",
                "Reconcile supplier invoices against the general ledger nightly",
            ),
            None,
        )
        .await?;
    harness
        .store
        .save(
            draft(
                "Healthcare",
                "Rotate on-call schedules for the radiology department weekly",
            ),
            None,
        )
        .await?;

    let hits = harness.store.text_search("invoices ledger", 10).await?;
    assert!(!hits.is_empty());
    assert_eq!(hits[0].0.id, saved.id);

    Ok(())
}

#[tokio::test]
async fn test_stats_counts_collection() -> Result<()> {
    let harness = TestHarness::new().await?;
    let provider = MockEmbedder::new(TEST_DIMENSION);

    harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            Some(&provider),
        )
        .await?;
    harness
        .store
        .save(
            draft("Finance", &"invoice archive compaction automation ".repeat(3)),
            None,
        )
        .await?;
    let rated = harness
        .store
        .save(
            draft("Retail", &"inventory rebalancing automation ".repeat(3)),
            None,
        )
        .await?;
    harness.store.add_rating(&rated.id, 4, None).await?;

    let stats = harness.store.stats().await?;
    assert_eq!(stats.total_solutions, 3);
    assert_eq!(stats.active_solutions, 3);
    assert_eq!(stats.unique_domains, 2);
    assert_eq!(stats.total_ratings, 1);
    assert_eq!(stats.recent_solutions, 3);
    assert_eq!(stats.with_embeddings, 1);
    assert_eq!(stats.without_embeddings, 2);
    assert!((stats.percentage_ready - 33.3).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_popular_domains_sorted_by_count() -> Result<()> {
    let harness = TestHarness::new().await?;

    for _ in 0..3 {
        harness
            .store
            .save(
                draft("Finance", &"ledger reconciliation automation ".repeat(3)),
                None,
            )
            .await?;
    }
    harness
        .store
        .save(
            draft("Retail", &"inventory rebalancing automation ".repeat(3)),
            None,
        )
        .await?;

    let domains = harness.store.popular_domains(5).await?;
    assert_eq!(domains.len(), 2);
    assert_eq!(domains[0], ("Finance".to_string(), 3));
    assert_eq!(domains[1], ("Retail".to_string(), 1));

    Ok(())
}

#[tokio::test]
async fn test_stats_on_empty_store() -> Result<()> {
    let harness = TestHarness::new().await?;

    let stats = harness.store.stats().await?;
    assert_eq!(stats.total_solutions, 0);
    assert_eq!(stats.total_ratings, 0);
    assert_eq!(stats.percentage_ready, 0.0);

    Ok(())
}
