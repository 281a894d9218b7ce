//! Append-only ratings attached to stored solutions.

use arrow_array::{Array, Int32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Table;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{SaveError, StoreError};
use super::solutions::{escape_literal, SolutionStore};
use crate::model::{Rating, RatingSummary};

const RATINGS_TABLE: &str = "ratings";

fn rating_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("solution_id", DataType::Utf8, false),
        Field::new("score", DataType::Int32, false),
        Field::new("comment", DataType::Utf8, false),
        Field::new("created_at", DataType::Int64, false),
    ])
}

fn ratings_to_batch(ratings: &[Rating]) -> Result<RecordBatch, StoreError> {
    let ids: Vec<&str> = ratings.iter().map(|r| r.id.as_str()).collect();
    let solution_ids: Vec<&str> = ratings.iter().map(|r| r.solution_id.as_str()).collect();
    let scores: Vec<i32> = ratings.iter().map(|r| r.score as i32).collect();
    let comments: Vec<&str> = ratings.iter().map(|r| r.comment.as_str()).collect();
    let created_ats: Vec<i64> = ratings.iter().map(|r| r.created_at.timestamp()).collect();

    Ok(RecordBatch::try_new(
        Arc::new(rating_schema()),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(solution_ids)),
            Arc::new(Int32Array::from(scores)),
            Arc::new(StringArray::from(comments)),
            Arc::new(Int64Array::from(created_ats)),
        ],
    )?)
}

fn read_ratings(batch: &RecordBatch) -> Result<Vec<Rating>, StoreError> {
    let column = |name: &'static str| {
        batch
            .column_by_name(name)
            .ok_or(StoreError::MissingColumn { name })
    };

    let ids = column("id")?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or(StoreError::MissingColumn { name: "id" })?;
    let solution_ids = column("solution_id")?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or(StoreError::MissingColumn { name: "solution_id" })?;
    let scores = column("score")?
        .as_any()
        .downcast_ref::<Int32Array>()
        .ok_or(StoreError::MissingColumn { name: "score" })?;
    let comments = column("comment")?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or(StoreError::MissingColumn { name: "comment" })?;
    let created_ats = column("created_at")?
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or(StoreError::MissingColumn { name: "created_at" })?;

    let mut ratings = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        ratings.push(Rating {
            id: ids.value(i).to_string(),
            solution_id: solution_ids.value(i).to_string(),
            score: scores.value(i).clamp(0, i32::from(u8::MAX)) as u8,
            comment: comments.value(i).to_string(),
            created_at: DateTime::from_timestamp(created_ats.value(i), 0)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        });
    }
    Ok(ratings)
}

impl SolutionStore {
    async fn ratings_table(&self) -> Result<Table, StoreError> {
        let table_names = self.db.table_names().execute().await?;

        if table_names.contains(&RATINGS_TABLE.to_string()) {
            Ok(self.db.open_table(RATINGS_TABLE).execute().await?)
        } else {
            debug!("Creating new table: {}", RATINGS_TABLE);
            let batches = RecordBatchIterator::new(vec![], Arc::new(rating_schema()));
            Ok(self
                .db
                .create_table(RATINGS_TABLE, Box::new(batches))
                .execute()
                .await?)
        }
    }

    /// Record a rating against an existing solution.
    ///
    /// The score must fall within the 1-5 scale and the solution must exist;
    /// nothing is written otherwise.
    pub async fn add_rating(
        &self,
        solution_id: &str,
        score: u8,
        comment: Option<&str>,
    ) -> Result<Rating, SaveError> {
        let rating = Rating::new(solution_id, score, comment, Utc::now())?;

        if self.get(solution_id).await?.is_none() {
            return Err(SaveError::Store(StoreError::NotFound {
                id: solution_id.to_string(),
            }));
        }

        let table = self.ratings_table().await?;
        let batch = ratings_to_batch(std::slice::from_ref(&rating))
            .map_err(StoreError::from)?;
        let batches = RecordBatchIterator::new(vec![Ok(batch)], Arc::new(rating_schema()));
        table
            .add(Box::new(batches))
            .execute()
            .await
            .map_err(StoreError::from)?;

        info!(solution_id = %solution_id, score = score, "Recorded rating");
        Ok(rating)
    }

    /// All ratings for one solution, newest first.
    pub async fn ratings_for(&self, solution_id: &str) -> Result<Vec<Rating>, StoreError> {
        let table = self.ratings_table().await?;
        let total_rows = Self::get_row_count_or_max(&table).await;

        let results = table
            .query()
            .only_if(format!(
                "solution_id = '{}'",
                escape_literal(solution_id)
            ))
            .limit(total_rows)
            .execute()
            .await?;

        let batches: Vec<RecordBatch> = results.try_collect().await?;

        let mut ratings = Vec::new();
        for batch in &batches {
            ratings.extend(read_ratings(batch)?);
        }
        ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ratings)
    }

    /// Average and count over all ratings for one solution.
    pub async fn rating_summary(&self, solution_id: &str) -> Result<RatingSummary, StoreError> {
        let ratings = self.ratings_for(solution_id).await?;
        let scores: Vec<u8> = ratings.iter().map(|r| r.score).collect();
        Ok(RatingSummary::from_scores(&scores))
    }

    /// Total number of ratings across all solutions.
    pub(super) async fn count_ratings(&self) -> Result<usize, StoreError> {
        let table_names = self.db.table_names().execute().await?;
        if !table_names.contains(&RATINGS_TABLE.to_string()) {
            return Ok(0);
        }
        let table = self.db.open_table(RATINGS_TABLE).execute().await?;
        Ok(table.count_rows(None).await?)
    }
}
