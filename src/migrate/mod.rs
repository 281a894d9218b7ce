//! Batched embedding backfill for records stored without vectors.
//!
//! Records saved while no provider was available (or whose embedding failed)
//! sit in the store with `has_embedding = false`. The driver selects a
//! bounded slice of them, embeds them batch by batch with a pause between
//! batches to stay polite to rate-limited providers, and records the outcome
//! per record. One bad record never aborts the run.

use anyhow::Result;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::embeddings::input::combined_embedding_text;
use crate::embeddings::EmbeddingProvider;
use crate::metrics::{BACKFILL_FAILURES, BACKFILL_RECORDS};
use crate::model::{Solution, VERSION_VECTOR};
use crate::store::SolutionStore;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_MAX_DOCUMENTS: usize = 50;

/// Pause between batches.
const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Runs one bounded backfill pass over the store.
pub struct BackfillDriver {
    store: Arc<SolutionStore>,
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    max_documents: usize,
}

/// One record the pass could not embed.
#[derive(Debug, Clone)]
pub struct BackfillFailure {
    pub id: String,
    pub domain: String,
    pub error: String,
}

/// Outcome of a backfill pass.
#[derive(Debug, Clone, Default)]
pub struct BackfillReport {
    /// Records selected for this pass.
    pub examined: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<BackfillFailure>,
}

impl BackfillReport {
    /// Print a summary of the pass to stdout.
    pub fn print_summary(&self) {
        if self.examined == 0 {
            println!("✅ Nothing to backfill: no active solutions are awaiting embeddings");
            return;
        }

        if self.failed == 0 {
            println!("✅ Embedded {} of {} solutions", self.succeeded, self.examined);
            return;
        }

        println!(
            "⚠️  Embedded {} of {} solutions, {} failed",
            self.succeeded, self.examined, self.failed
        );
        println!();

        for failure in self.failures.iter().take(5) {
            println!("    - {} ({}): {}", failure.id, failure.domain, failure.error);
        }
        if self.failures.len() > 5 {
            println!("    ... and {} more", self.failures.len() - 5);
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl BackfillDriver {
    pub fn new(store: Arc<SolutionStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
            max_documents: DEFAULT_MAX_DOCUMENTS,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }

    /// Run one pass: select pending records, embed them in paced batches,
    /// and persist every outcome.
    ///
    /// Re-running is safe; embedded records no longer match the selection
    /// and a second pass finds nothing left to do.
    pub async fn run(&self) -> Result<BackfillReport> {
        let pending = self.store.pending_backfill(self.max_documents).await?;

        let mut report = BackfillReport {
            examined: pending.len(),
            ..Default::default()
        };

        if pending.is_empty() {
            info!("No solutions awaiting embeddings");
            return Ok(report);
        }

        info!(
            pending = pending.len(),
            batch_size = self.batch_size,
            "Starting embedding backfill"
        );

        let progress = ProgressBar::new(pending.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] Embedding: [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        for (batch_idx, batch) in pending.chunks(self.batch_size).enumerate() {
            if batch_idx > 0 {
                tokio::time::sleep(BATCH_PAUSE).await;
            }

            for solution in batch {
                match self.backfill_one(solution).await {
                    Ok(()) => {
                        report.succeeded += 1;
                        BACKFILL_RECORDS.inc();
                    }
                    Err(e) => {
                        report.failed += 1;
                        BACKFILL_FAILURES.inc();
                        warn!(id = %solution.id, error = %e, "Backfill failed for solution");
                        report.failures.push(BackfillFailure {
                            id: solution.id.clone(),
                            domain: solution.domain.clone(),
                            error: e.to_string(),
                        });
                    }
                }
                progress.inc(1);
            }
        }

        progress.finish_and_clear();

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "Embedding backfill finished"
        );

        Ok(report)
    }

    /// Embed one record and persist the outcome, success or failure.
    async fn backfill_one(&self, solution: &Solution) -> Result<()> {
        let text = combined_embedding_text(solution);
        let expected = self.store.dimension();

        let outcome = match self.provider.embed_document(&text).await {
            Ok(vector) if vector.len() == expected => Ok(vector),
            Ok(vector) if vector.is_empty() => {
                Err("provider returned an empty embedding".to_string())
            }
            Ok(vector) => Err(format!(
                "expected {} dimensions, provider returned {}",
                expected,
                vector.len()
            )),
            Err(e) => Err(e.to_string()),
        };

        let mut updated = solution.clone();
        match outcome {
            Ok(vector) => {
                updated.embedding = Some(vector);
                updated.search_metadata.has_embedding = true;
                updated.search_metadata.embedding_model =
                    Some(self.provider.model_id().to_string());
                updated.search_metadata.embedding_timestamp = Some(Utc::now());
                updated.search_metadata.embedding_error = None;
                updated.version = VERSION_VECTOR.to_string();
                self.store.replace(&updated).await?;
                Ok(())
            }
            Err(reason) => {
                updated.embedding = None;
                updated.search_metadata.has_embedding = false;
                updated.search_metadata.embedding_error = Some(reason.clone());
                updated.search_metadata.embedding_attempts =
                    updated.search_metadata.embedding_attempts.saturating_add(1);
                self.store.replace(&updated).await?;
                Err(anyhow::anyhow!(reason))
            }
        }
    }
}
