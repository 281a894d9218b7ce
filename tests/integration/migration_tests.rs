use anyhow::Result;
use std::sync::Arc;

use solsearch::embeddings::mock::MockEmbedder;
use solsearch::migrate::BackfillDriver;
use solsearch::model::VERSION_VECTOR;
use solsearch::store::MAX_EMBEDDING_ATTEMPTS;

use crate::helpers::mock_embeddings::FlakyEmbedder;
use crate::helpers::test_harness::{draft, TestHarness, TEST_DIMENSION};

#[tokio::test]
async fn test_backfill_attaches_embeddings() -> Result<()> {
    let harness = TestHarness::new().await?;

    let mut ids = Vec::new();
    for summary in [
        "Reconcile supplier invoices against the general ledger nightly",
        "Rotate on-call schedules for the radiology department weekly",
        "Rebalance store inventory between regional warehouses on demand",
    ] {
        let saved = harness.store.save(draft("Mixed", summary), None).await?;
        ids.push(saved.id);
    }

    let driver = BackfillDriver::new(
        harness.store.clone(),
        Arc::new(MockEmbedder::new(TEST_DIMENSION)),
    );
    let report = driver.run().await?;

    assert_eq!(report.examined, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 0);
    assert!(!report.has_failures());

    for id in &ids {
        let solution = harness.store.get(id).await?.unwrap();
        assert!(solution.search_metadata.has_embedding);
        assert_eq!(
            solution.search_metadata.embedding_model.as_deref(),
            Some("mock-embedder")
        );
        assert!(solution.search_metadata.embedding_timestamp.is_some());
        assert!(solution.search_metadata.embedding_error.is_none());
        assert_eq!(solution.version, VERSION_VECTOR);
        assert_eq!(
            solution.embedding.as_ref().map(Vec::len),
            Some(TEST_DIMENSION)
        );
    }

    // Backfilled records are now reachable through the vector operator.
    let results = harness
        .store
        .vector_search(vec![0.1; TEST_DIMENSION], 10)
        .await?;
    assert_eq!(results.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_backfill_second_run_finds_nothing() -> Result<()> {
    let harness = TestHarness::new().await?;
    harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    let driver = BackfillDriver::new(
        harness.store.clone(),
        Arc::new(MockEmbedder::new(TEST_DIMENSION)),
    );

    let first = driver.run().await?;
    assert_eq!(first.succeeded, 1);

    let second = driver.run().await?;
    assert_eq!(second.examined, 0);
    assert_eq!(second.succeeded, 0);

    Ok(())
}

#[tokio::test]
async fn test_backfill_records_failures_and_continues() -> Result<()> {
    let harness = TestHarness::new().await?;

    let poisoned = harness
        .store
        .save(
            draft(
                "Finance",
                "Assemble the poison quarterly filing from branch spreadsheets",
            ),
            None,
        )
        .await?;
    let healthy = harness
        .store
        .save(
            draft(
                "Retail",
                "Rebalance store inventory between regional warehouses on demand",
            ),
            None,
        )
        .await?;

    let driver = BackfillDriver::new(
        harness.store.clone(),
        Arc::new(FlakyEmbedder::new(TEST_DIMENSION, "poison")),
    );
    let report = driver.run().await?;

    assert_eq!(report.examined, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, poisoned.id);
    assert!(report.failures[0].error.contains("rate limit"));

    // The failed record keeps its diagnostic and stays lexical-only.
    let failed = harness.store.get(&poisoned.id).await?.unwrap();
    assert!(!failed.search_metadata.has_embedding);
    assert!(failed.embedding.is_none());
    assert_eq!(failed.search_metadata.embedding_attempts, 1);
    let error = failed.search_metadata.embedding_error.unwrap();
    assert!(error.contains("rate limit"), "got: {error}");

    // The other record embedded normally in the same pass.
    let ok = harness.store.get(&healthy.id).await?.unwrap();
    assert!(ok.search_metadata.has_embedding);

    Ok(())
}

#[tokio::test]
async fn test_backfill_skips_exhausted_records() -> Result<()> {
    let harness = TestHarness::new().await?;

    // Simulate a record that already burned through its attempts.
    let mut exhausted = harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;
    exhausted.search_metadata.embedding_attempts = MAX_EMBEDDING_ATTEMPTS;
    harness.store.replace(&exhausted).await?;

    let driver = BackfillDriver::new(
        harness.store.clone(),
        Arc::new(MockEmbedder::new(TEST_DIMENSION)),
    );
    let report = driver.run().await?;

    assert_eq!(report.examined, 0);

    let unchanged = harness.store.get(&exhausted.id).await?.unwrap();
    assert!(!unchanged.search_metadata.has_embedding);

    Ok(())
}

#[tokio::test]
async fn test_backfill_honors_max_documents() -> Result<()> {
    let harness = TestHarness::new().await?;

    for i in 0..3 {
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

    let driver = BackfillDriver::new(
        harness.store.clone(),
        Arc::new(MockEmbedder::new(TEST_DIMENSION)),
    )
    .with_max_documents(2);

    let report = driver.run().await?;
    assert_eq!(report.examined, 2);
    assert_eq!(report.succeeded, 2);

    // One record is still waiting for the next pass.
    let pending = harness.store.pending_backfill(10).await?;
    assert_eq!(pending.len(), 1);

    Ok(())
}
