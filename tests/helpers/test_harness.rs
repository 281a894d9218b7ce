use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use solsearch::model::SolutionDraft;
use solsearch::SolutionStore;

/// Embedding dimensionality shared by every harness-backed test.
pub const TEST_DIMENSION: usize = 64;

pub struct TestHarness {
    pub temp_dir: TempDir,
    pub store: Arc<SolutionStore>,
}

impl TestHarness {
    /// Store with both native search operators available.
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.lance");
        let store = SolutionStore::open(&db_path, TEST_DIMENSION, Some(temp_dir.path())).await?;

        Ok(Self {
            temp_dir,
            store: Arc::new(store),
        })
    }

    /// Store without a lexical index, as deployed when text search is off.
    pub async fn without_text_index() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.lance");
        let store = SolutionStore::open(&db_path, TEST_DIMENSION, None).await?;

        Ok(Self {
            temp_dir,
            store: Arc::new(store),
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// A draft that passes validation, themed for `domain`.
///
/// The summary is caller-supplied so tests control the searchable text; the
/// other fields are filler long enough to clear the storability minimums.
pub fn draft(domain: &str, summary: &str) -> SolutionDraft {
    SolutionDraft {
        domain: domain.to_string(),
        summary: summary.to_string(),
        script: "#!/bin/bash\nset -euo pipefail\nfetch_records\ntransform_records\npublish_report\n"
            .to_string(),
        unit_tests: "assert_report_published() { test -s out/report.csv; }".to_string(),
        prerequisites: "bash 5 with coreutils on the automation host".to_string(),
        block_diagram: "fetch -> transform -> publish".to_string(),
        extra_info: "Scheduled nightly; safe to re-run on failure.".to_string(),
    }
}
