//! LanceDB-backed store for solution records.
//!
//! The database is the source of truth and supplies the native
//! vector-similarity operator; an optional Tantivy index over the searchable
//! text fields supplies the native lexical operator. Records are never
//! deleted through this API, only inserted or replaced in full.

use arrow_array::types::Float32Type;
use arrow_array::{
    Array, BooleanArray, FixedSizeListArray, Float32Array, Int32Array, Int64Array, RecordBatch,
    RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use chrono::{DateTime, Duration, Utc};
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{connect, Connection, Table};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use super::error::{SaveError, StoreError};
use super::text_index::{TextHit, TextIndex};
use crate::embeddings::input::combined_embedding_text;
use crate::embeddings::EmbeddingProvider;
use crate::model::{
    SearchMetadata, Solution, SolutionDraft, SolutionStatus, VERSION_VECTOR,
};

const SOLUTIONS_TABLE: &str = "solutions";

/// Maximum number of rows to query when fetching all data.
/// Used as a fallback when count_rows fails, and as an upper bound for safety.
const MAX_QUERY_ROWS: usize = 10_000_000;

/// Bound on connection establishment. Exceeding it is a fatal
/// initialization error, not retried.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Backfill stops re-selecting a record after this many failed embedding
/// attempts, so a persistently bad input cannot burn provider quota forever.
pub const MAX_EMBEDDING_ATTEMPTS: u32 = 5;

/// Filter for records eligible for vector search.
const ACTIVE_EMBEDDED_FILTER: &str = "status = 'active' AND has_embedding = true";

/// Collection-level statistics for the stats command.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_solutions: usize,
    pub active_solutions: usize,
    pub unique_domains: usize,
    pub total_ratings: usize,
    /// Solutions created within the last 7 days.
    pub recent_solutions: usize,
    pub with_embeddings: usize,
    pub without_embeddings: usize,
    /// Share of records ready for vector search, rounded to one decimal.
    pub percentage_ready: f64,
}

/// Store for solution records, combining LanceDB and the lexical index.
pub struct SolutionStore {
    pub(super) db: Connection,
    db_path: PathBuf,
    dimension: i32,
    /// Absent when the deployment runs without a lexical index; the native
    /// text operator then reports `IndexNotConfigured`.
    text: Option<RwLock<TextIndex>>,
}

impl SolutionStore {
    /// Open (or create) the store at `db_path` with the given embedding
    /// dimensionality. When `text_index_path` is provided, the lexical index
    /// is opened or created under it.
    pub async fn open(
        db_path: &Path,
        dimension: usize,
        text_index_path: Option<&Path>,
    ) -> Result<Self, StoreError> {
        let path_str = db_path.to_string_lossy().to_string();

        info!("Opening solution database at: {}", path_str);

        let connect_future = connect(&path_str).execute();
        let db = tokio::time::timeout(
            std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS),
            connect_future,
        )
        .await
        .map_err(|_| StoreError::ConnectTimeout {
            path: path_str.clone(),
            seconds: CONNECT_TIMEOUT_SECS,
        })??;

        let text = match text_index_path {
            Some(path) => Some(RwLock::new(TextIndex::open_or_create(path)?)),
            None => None,
        };

        Ok(Self {
            db,
            db_path: db_path.to_path_buf(),
            dimension: dimension as i32,
            text,
        })
    }

    /// The embedding dimensionality this store was opened with.
    pub fn dimension(&self) -> usize {
        self.dimension as usize
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether the native lexical operator is available.
    pub fn has_text_index(&self) -> bool {
        self.text.is_some()
    }

    /// Get or create the solutions table.
    async fn solutions_table(&self) -> Result<Table, StoreError> {
        let table_names = self.db.table_names().execute().await?;

        if table_names.contains(&SOLUTIONS_TABLE.to_string()) {
            debug!("Opening existing table: {}", SOLUTIONS_TABLE);
            Ok(self.db.open_table(SOLUTIONS_TABLE).execute().await?)
        } else {
            debug!("Creating new table: {}", SOLUTIONS_TABLE);
            let schema = self.solution_schema();
            let batches = RecordBatchIterator::new(vec![], Arc::new(schema));
            Ok(self
                .db
                .create_table(SOLUTIONS_TABLE, Box::new(batches))
                .execute()
                .await?)
        }
    }

    /// Get the row count for a table, with fallback to MAX_QUERY_ROWS on error.
    pub(super) async fn get_row_count_or_max(table: &Table) -> usize {
        match table.count_rows(None).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = MAX_QUERY_ROWS,
                    "Failed to count rows, using fallback limit"
                );
                MAX_QUERY_ROWS
            }
        }
    }

    /// Arrow schema for the solutions table.
    fn solution_schema(&self) -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("domain", DataType::Utf8, false),
            Field::new("summary", DataType::Utf8, false),
            Field::new("script", DataType::Utf8, false),
            Field::new("unit_tests", DataType::Utf8, false),
            Field::new("prerequisites", DataType::Utf8, false),
            Field::new("block_diagram", DataType::Utf8, false),
            Field::new("extra_info", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.dimension,
                ),
                true,
            ),
            Field::new("has_embedding", DataType::Boolean, false),
            Field::new("embedding_model", DataType::Utf8, true),
            Field::new("embedding_timestamp", DataType::Int64, true),
            Field::new("embedding_error", DataType::Utf8, true),
            Field::new("embedding_attempts", DataType::Int32, false),
            Field::new("status", DataType::Utf8, false),
            Field::new("created_at", DataType::Int64, false),
            Field::new("version", DataType::Utf8, false),
            Field::new("usage_count", DataType::Int64, false),
        ])
    }

    /// Convert solutions to an Arrow RecordBatch.
    fn solutions_to_batch(&self, solutions: &[Solution]) -> Result<RecordBatch, StoreError> {
        let ids: Vec<&str> = solutions.iter().map(|s| s.id.as_str()).collect();
        let domains: Vec<&str> = solutions.iter().map(|s| s.domain.as_str()).collect();
        let summaries: Vec<&str> = solutions.iter().map(|s| s.summary.as_str()).collect();
        let scripts: Vec<&str> = solutions.iter().map(|s| s.script.as_str()).collect();
        let unit_tests: Vec<&str> = solutions.iter().map(|s| s.unit_tests.as_str()).collect();
        let prerequisites: Vec<&str> = solutions
            .iter()
            .map(|s| s.prerequisites.as_str())
            .collect();
        let block_diagrams: Vec<&str> = solutions
            .iter()
            .map(|s| s.block_diagram.as_str())
            .collect();
        let extra_infos: Vec<&str> = solutions.iter().map(|s| s.extra_info.as_str()).collect();

        let embedding_array = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            solutions
                .iter()
                .map(|s| s.embedding.as_ref().map(|v| v.iter().map(|&x| Some(x)))),
            self.dimension,
        );

        let has_embeddings: Vec<bool> = solutions
            .iter()
            .map(|s| s.search_metadata.has_embedding)
            .collect();
        let embedding_models: Vec<Option<&str>> = solutions
            .iter()
            .map(|s| s.search_metadata.embedding_model.as_deref())
            .collect();
        let embedding_timestamps: Vec<Option<i64>> = solutions
            .iter()
            .map(|s| s.search_metadata.embedding_timestamp.map(|t| t.timestamp()))
            .collect();
        let embedding_errors: Vec<Option<&str>> = solutions
            .iter()
            .map(|s| s.search_metadata.embedding_error.as_deref())
            .collect();
        let embedding_attempts: Vec<i32> = solutions
            .iter()
            .map(|s| s.search_metadata.embedding_attempts as i32)
            .collect();

        let statuses: Vec<&str> = solutions.iter().map(|s| s.status.as_str()).collect();
        let created_ats: Vec<i64> = solutions.iter().map(|s| s.created_at.timestamp()).collect();
        let versions: Vec<&str> = solutions.iter().map(|s| s.version.as_str()).collect();
        let usage_counts: Vec<i64> = solutions.iter().map(|s| s.usage_count as i64).collect();

        let schema = Arc::new(self.solution_schema());

        Ok(RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(domains)),
                Arc::new(StringArray::from(summaries)),
                Arc::new(StringArray::from(scripts)),
                Arc::new(StringArray::from(unit_tests)),
                Arc::new(StringArray::from(prerequisites)),
                Arc::new(StringArray::from(block_diagrams)),
                Arc::new(StringArray::from(extra_infos)),
                Arc::new(embedding_array),
                Arc::new(BooleanArray::from(has_embeddings)),
                Arc::new(StringArray::from(embedding_models)),
                Arc::new(Int64Array::from(embedding_timestamps)),
                Arc::new(StringArray::from(embedding_errors)),
                Arc::new(Int32Array::from(embedding_attempts)),
                Arc::new(StringArray::from(statuses)),
                Arc::new(Int64Array::from(created_ats)),
                Arc::new(StringArray::from(versions)),
                Arc::new(Int64Array::from(usage_counts)),
            ],
        )?)
    }

    /// Validate a draft, attempt an embedding if a provider is present, and
    /// insert the resulting record.
    ///
    /// Embedding failures are non-fatal: the record is stored without one and
    /// carries the error in its search metadata for the backfill to retry.
    pub async fn save(
        &self,
        draft: SolutionDraft,
        provider: Option<&dyn EmbeddingProvider>,
    ) -> Result<Solution, SaveError> {
        draft.validate()?;

        let mut solution = Solution::from_draft(draft, Utc::now());

        if let Some(provider) = provider {
            let text = combined_embedding_text(&solution);
            match provider.embed_document(&text).await {
                Ok(vector) if vector.len() == self.dimension as usize => {
                    solution.embedding = Some(vector);
                    solution.search_metadata.has_embedding = true;
                    solution.search_metadata.embedding_model =
                        Some(provider.model_id().to_string());
                    solution.search_metadata.embedding_timestamp = Some(Utc::now());
                    solution.version = VERSION_VECTOR.to_string();
                }
                Ok(vector) => {
                    let reason = if vector.is_empty() {
                        "provider returned an empty embedding".to_string()
                    } else {
                        format!(
                            "expected {} dimensions, provider returned {}",
                            self.dimension,
                            vector.len()
                        )
                    };
                    warn!(id = %solution.id, reason = %reason, "Saving solution without embedding");
                    solution.search_metadata.embedding_error = Some(reason);
                }
                Err(e) => {
                    warn!(id = %solution.id, error = %e, "Embedding generation failed at save time");
                    solution.search_metadata.embedding_error = Some(e.to_string());
                }
            }
        }

        self.insert(&solution).await?;
        Ok(solution)
    }

    /// Insert a record into the database and, when configured, the lexical
    /// index.
    pub async fn insert(&self, solution: &Solution) -> Result<(), StoreError> {
        let table = self.solutions_table().await?;

        let batch = self.solutions_to_batch(std::slice::from_ref(solution))?;
        let batches =
            RecordBatchIterator::new(vec![Ok(batch)], Arc::new(self.solution_schema()));

        table.add(Box::new(batches)).execute().await?;

        if let Some(lock) = &self.text {
            let mut index = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            index.add_solution(solution)?;
            index.commit()?;
        }

        info!(id = %solution.id, domain = %solution.domain, "Inserted solution");
        Ok(())
    }

    /// Replace a record in place, keyed by id. Used by the backfill driver to
    /// attach embeddings and update search metadata.
    pub async fn replace(&self, solution: &Solution) -> Result<(), StoreError> {
        let table = self.solutions_table().await?;

        table
            .delete(&format!("id = '{}'", escape_literal(&solution.id)))
            .await?;

        let batch = self.solutions_to_batch(std::slice::from_ref(solution))?;
        let batches =
            RecordBatchIterator::new(vec![Ok(batch)], Arc::new(self.solution_schema()));
        table.add(Box::new(batches)).execute().await?;

        if let Some(lock) = &self.text {
            let mut index = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            index.delete_solution(&solution.id);
            index.add_solution(solution)?;
            index.commit()?;
        }

        debug!(id = %solution.id, "Replaced solution");
        Ok(())
    }

    /// Exact-id lookup.
    pub async fn get(&self, id: &str) -> Result<Option<Solution>, StoreError> {
        let table = self.solutions_table().await?;

        let results = table
            .query()
            .only_if(format!("id = '{}'", escape_literal(id)))
            .limit(1)
            .execute()
            .await?;

        let batches: Vec<RecordBatch> = results.try_collect().await?;

        for batch in &batches {
            if let Some(solution) = read_solutions(batch)?.into_iter().next() {
                return Ok(Some(solution));
            }
        }
        Ok(None)
    }

    /// All active records. The regex fallback and statistics scan this.
    pub async fn scan_active(&self) -> Result<Vec<Solution>, StoreError> {
        let table = self.solutions_table().await?;
        let total_rows = Self::get_row_count_or_max(&table).await;

        let results = table
            .query()
            .only_if("status = 'active'")
            .limit(total_rows)
            .execute()
            .await?;

        let batches: Vec<RecordBatch> = results.try_collect().await?;

        let mut solutions = Vec::new();
        for batch in &batches {
            solutions.extend(read_solutions(batch)?);
        }

        debug!("Scanned {} active solutions", solutions.len());
        Ok(solutions)
    }

    /// Active records, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<Solution>, StoreError> {
        let mut solutions = self.scan_active().await?;
        solutions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        solutions.truncate(limit);
        Ok(solutions)
    }

    /// Native vector-similarity operator. Only active records with a stored
    /// embedding are candidates; results carry a similarity derived from the
    /// engine distance.
    pub async fn vector_search(
        &self,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<(Solution, f32)>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let table = self.solutions_table().await?;

        let results = table
            .vector_search(vector)?
            .only_if(ACTIVE_EMBEDDED_FILTER)
            .limit(limit)
            .execute()
            .await?;

        let batches: Vec<RecordBatch> = results.try_collect().await?;

        let mut matches = Vec::new();
        for batch in &batches {
            let solutions = read_solutions(batch)?;

            // LanceDB returns a _distance column for similarity ranking
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

            for (i, solution) in solutions.into_iter().enumerate() {
                let score = distances
                    .map(|d| 1.0 / (1.0 + d.value(i))) // Convert distance to similarity
                    .unwrap_or(1.0);
                matches.push((solution, score));
            }
        }

        Ok(matches)
    }

    /// Native lexical operator: Tantivy ranking with hits hydrated back into
    /// full records, in hit order. Errors with `IndexNotConfigured` when the
    /// store was opened without a text index.
    pub async fn text_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(Solution, f32)>, StoreError> {
        let lock = self
            .text
            .as_ref()
            .ok_or(StoreError::IndexNotConfigured { kind: "text" })?;

        // Scope the guard so it is released before any await point.
        let hits: Vec<TextHit> = {
            let index = lock.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            index.search(query, limit)?
        };

        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let by_id = self
            .fetch_by_ids(hits.iter().map(|h| h.id.as_str()))
            .await?;

        let mut matches = Vec::with_capacity(hits.len());
        for hit in hits {
            match by_id.get(&hit.id) {
                Some(solution) => matches.push((solution.clone(), hit.score)),
                None => warn!(id = %hit.id, "Text index hit has no active record, skipping"),
            }
        }
        Ok(matches)
    }

    /// Fetch active records for a set of ids in one query.
    async fn fetch_by_ids(
        &self,
        ids: impl Iterator<Item = &str>,
    ) -> Result<HashMap<String, Solution>, StoreError> {
        let quoted: Vec<String> = ids
            .map(|id| format!("'{}'", escape_literal(id)))
            .collect();
        if quoted.is_empty() {
            return Ok(HashMap::new());
        }

        let table = self.solutions_table().await?;
        let predicate = format!(
            "status = 'active' AND id IN ({})",
            quoted.join(", ")
        );

        let results = table
            .query()
            .only_if(predicate)
            .limit(quoted.len())
            .execute()
            .await?;

        let batches: Vec<RecordBatch> = results.try_collect().await?;

        let mut by_id = HashMap::new();
        for batch in &batches {
            for solution in read_solutions(batch)? {
                by_id.insert(solution.id.clone(), solution);
            }
        }
        Ok(by_id)
    }

    /// Active records still waiting for an embedding, capped at `cap`.
    ///
    /// Records that already failed [`MAX_EMBEDDING_ATTEMPTS`] times are left
    /// out so the backfill stops retrying hopeless inputs.
    pub async fn pending_backfill(&self, cap: usize) -> Result<Vec<Solution>, StoreError> {
        if cap == 0 {
            return Ok(Vec::new());
        }

        let table = self.solutions_table().await?;

        let results = table
            .query()
            .only_if(format!(
                "has_embedding = false AND embedding_attempts < {} AND status = 'active'",
                MAX_EMBEDDING_ATTEMPTS
            ))
            .limit(cap)
            .execute()
            .await?;

        let batches: Vec<RecordBatch> = results.try_collect().await?;

        let mut solutions = Vec::new();
        for batch in &batches {
            solutions.extend(read_solutions(batch)?);
        }
        Ok(solutions)
    }

    /// Domains of active records with how many records each holds, most
    /// common first. Ties break alphabetically.
    pub async fn popular_domains(
        &self,
        limit: usize,
    ) -> Result<Vec<(String, usize)>, StoreError> {
        let table = self.solutions_table().await?;
        let total_rows = Self::get_row_count_or_max(&table).await;

        let results = table
            .query()
            .select(Select::Columns(vec!["domain".to_string()]))
            .only_if("status = 'active'")
            .limit(total_rows)
            .execute()
            .await?;

        let batches: Vec<RecordBatch> = results.try_collect().await?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for batch in &batches {
            let domains = str_column(batch, "domain")?;
            for i in 0..batch.num_rows() {
                *counts.entry(domains.value(i).to_string()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Collection statistics: totals, embedding coverage and recency.
    pub async fn stats(&self) -> Result<DatabaseStats, StoreError> {
        let table = self.solutions_table().await?;

        let total_solutions = table.count_rows(None).await?;
        let active_solutions = table
            .count_rows(Some("status = 'active'".to_string()))
            .await?;
        let with_embeddings = table
            .count_rows(Some("has_embedding = true".to_string()))
            .await?;

        let cutoff = (Utc::now() - Duration::days(7)).timestamp();
        let recent_solutions = table
            .count_rows(Some(format!("created_at >= {}", cutoff)))
            .await?;

        let unique_domains = {
            let total_rows = Self::get_row_count_or_max(&table).await;
            let results = table
                .query()
                .select(Select::Columns(vec!["domain".to_string()]))
                .only_if("status = 'active'")
                .limit(total_rows)
                .execute()
                .await?;
            let batches: Vec<RecordBatch> = results.try_collect().await?;

            let mut domains: HashSet<String> = HashSet::new();
            for batch in &batches {
                let column = str_column(batch, "domain")?;
                for i in 0..batch.num_rows() {
                    domains.insert(column.value(i).to_string());
                }
            }
            domains.len()
        };

        let total_ratings = self.count_ratings().await?;

        let percentage_ready = if total_solutions == 0 {
            0.0
        } else {
            let raw = with_embeddings as f64 / total_solutions as f64 * 100.0;
            (raw * 10.0).round() / 10.0
        };

        Ok(DatabaseStats {
            total_solutions,
            active_solutions,
            unique_domains,
            total_ratings,
            recent_solutions,
            with_embeddings,
            without_embeddings: total_solutions - with_embeddings,
            percentage_ready,
        })
    }
}

/// Escape a string literal for use inside a store filter predicate.
pub(super) fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn str_column<'a>(
    batch: &'a RecordBatch,
    name: &'static str,
) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or(StoreError::MissingColumn { name })
}

fn i64_column<'a>(
    batch: &'a RecordBatch,
    name: &'static str,
) -> Result<&'a Int64Array, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or(StoreError::MissingColumn { name })
}

fn i32_column<'a>(
    batch: &'a RecordBatch,
    name: &'static str,
) -> Result<&'a Int32Array, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or(StoreError::MissingColumn { name })
}

fn bool_column<'a>(
    batch: &'a RecordBatch,
    name: &'static str,
) -> Result<&'a BooleanArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<BooleanArray>())
        .ok_or(StoreError::MissingColumn { name })
}

fn opt_str(column: Option<&StringArray>, i: usize) -> Option<String> {
    column.and_then(|c| {
        if c.is_null(i) {
            None
        } else {
            Some(c.value(i).to_string())
        }
    })
}

/// Decode full solution records from a batch.
///
/// Works for any batch that carries the full column set, including vector
/// search results with their extra `_distance` column.
pub(super) fn read_solutions(batch: &RecordBatch) -> Result<Vec<Solution>, StoreError> {
    let ids = str_column(batch, "id")?;
    let domains = str_column(batch, "domain")?;
    let summaries = str_column(batch, "summary")?;
    let scripts = str_column(batch, "script")?;
    let unit_tests = str_column(batch, "unit_tests")?;
    let prerequisites = str_column(batch, "prerequisites")?;
    let block_diagrams = str_column(batch, "block_diagram")?;
    let extra_infos = str_column(batch, "extra_info")?;
    let has_embeddings = bool_column(batch, "has_embedding")?;
    let embedding_attempts = i32_column(batch, "embedding_attempts")?;
    let statuses = str_column(batch, "status")?;
    let created_ats = i64_column(batch, "created_at")?;
    let versions = str_column(batch, "version")?;
    let usage_counts = i64_column(batch, "usage_count")?;

    let embeddings = batch
        .column_by_name("embedding")
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>());
    let embedding_models = batch
        .column_by_name("embedding_model")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let embedding_errors = batch
        .column_by_name("embedding_error")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let embedding_timestamps = batch
        .column_by_name("embedding_timestamp")
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>());

    let mut solutions = Vec::with_capacity(batch.num_rows());

    for i in 0..batch.num_rows() {
        let embedding = embeddings.and_then(|e| {
            if e.is_null(i) {
                None
            } else {
                let values = e.value(i);
                values
                    .as_any()
                    .downcast_ref::<Float32Array>()
                    .map(|floats| floats.iter().flatten().collect::<Vec<f32>>())
            }
        });

        let embedding_timestamp = embedding_timestamps.and_then(|t| {
            if t.is_null(i) {
                None
            } else {
                DateTime::from_timestamp(t.value(i), 0)
            }
        });

        let created_at = DateTime::from_timestamp(created_ats.value(i), 0)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        solutions.push(Solution {
            id: ids.value(i).to_string(),
            domain: domains.value(i).to_string(),
            summary: summaries.value(i).to_string(),
            script: scripts.value(i).to_string(),
            unit_tests: unit_tests.value(i).to_string(),
            prerequisites: prerequisites.value(i).to_string(),
            block_diagram: block_diagrams.value(i).to_string(),
            extra_info: extra_infos.value(i).to_string(),
            embedding,
            search_metadata: SearchMetadata {
                has_embedding: has_embeddings.value(i),
                embedding_model: opt_str(embedding_models, i),
                embedding_timestamp,
                embedding_error: opt_str(embedding_errors, i),
                embedding_attempts: embedding_attempts.value(i).max(0) as u32,
            },
            status: SolutionStatus::from_column(statuses.value(i)),
            created_at,
            version: versions.value(i).to_string(),
            usage_count: usage_counts.value(i).max(0) as u64,
        });
    }

    Ok(solutions)
}

// Required for arrow streams
use futures::TryStreamExt;
