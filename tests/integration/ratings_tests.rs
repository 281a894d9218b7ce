use anyhow::Result;

use solsearch::model::ValidationError;
use solsearch::store::{SaveError, StoreError};

use crate::helpers::test_harness::{draft, TestHarness};

#[tokio::test]
async fn test_add_rating_and_summary() -> Result<()> {
    let harness = TestHarness::new().await?;
    let solution = harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    harness.store.add_rating(&solution.id, 4, None).await?;
    harness
        .store
        .add_rating(&solution.id, 5, Some("saved the team an afternoon"))
        .await?;

    let summary = harness.store.rating_summary(&solution.id).await?;
    assert_eq!(summary.count, 2);
    assert!((summary.average - 4.5).abs() < f64::EPSILON);

    Ok(())
}

#[tokio::test]
async fn test_rating_out_of_range_rejected() -> Result<()> {
    let harness = TestHarness::new().await?;
    let solution = harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    for score in [0u8, 6] {
        let err = harness
            .store
            .add_rating(&solution.id, score, None)
            .await
            .expect_err("out-of-range score must be rejected");
        assert!(matches!(
            err,
            SaveError::Invalid(ValidationError::RatingOutOfRange { .. })
        ));
    }

    // Nothing was recorded.
    let summary = harness.store.rating_summary(&solution.id).await?;
    assert_eq!(summary.count, 0);

    Ok(())
}

#[tokio::test]
async fn test_rating_unknown_solution_rejected() -> Result<()> {
    let harness = TestHarness::new().await?;
    // Create the solutions table so the lookup has somewhere to look.
    harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    let err = harness
        .store
        .add_rating("no-such-id", 3, None)
        .await
        .expect_err("rating an unknown solution must fail");

    match err {
        SaveError::Store(StoreError::NotFound { id }) => assert_eq!(id, "no-such-id"),
        other => panic!("expected NotFound, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_ratings_listed_newest_first() -> Result<()> {
    let harness = TestHarness::new().await?;
    let solution = harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    for score in [2u8, 3, 4] {
        harness.store.add_rating(&solution.id, score, None).await?;
    }

    let ratings = harness.store.ratings_for(&solution.id).await?;
    assert_eq!(ratings.len(), 3);
    assert!(ratings[0].created_at >= ratings[1].created_at);
    assert!(ratings[1].created_at >= ratings[2].created_at);

    Ok(())
}

#[tokio::test]
async fn test_rating_comment_round_trip() -> Result<()> {
    let harness = TestHarness::new().await?;
    let solution = harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    harness
        .store
        .add_rating(&solution.id, 5, Some("  works on the staging host  "))
        .await?;

    let ratings = harness.store.ratings_for(&solution.id).await?;
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].score, 5);
    // Comments are stored trimmed.
    assert_eq!(ratings[0].comment, "works on the staging host");
    assert_eq!(ratings[0].solution_id, solution.id);

    Ok(())
}

#[tokio::test]
async fn test_summary_for_unrated_solution() -> Result<()> {
    let harness = TestHarness::new().await?;
    let solution = harness
        .store
        .save(
            draft("Finance", &"ledger reconciliation automation ".repeat(3)),
            None,
        )
        .await?;

    let summary = harness.store.rating_summary(&solution.id).await?;
    assert_eq!(summary.count, 0);
    assert_eq!(summary.average, 0.0);

    Ok(())
}
