//! Lexical search over solution records using Tantivy.
//!
//! The index carries the four searchable text fields and stores only the
//! record id; hits are hydrated back into full records from the database.

use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value as _, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info, warn};

use super::error::StoreError;
use crate::model::Solution;

/// Text index directory name within .solsearch/
const TEXT_INDEX_DIR: &str = "text.index";

/// Schema field names
const FIELD_ID: &str = "id";
const FIELD_DOMAIN: &str = "domain";
const FIELD_SUMMARY: &str = "summary";
const FIELD_EXTRA_INFO: &str = "extra_info";
const FIELD_SCRIPT: &str = "script";

/// Tantivy schema for solution documents.
///
/// `id` is indexed raw (untokenized) so a record can be deleted by exact term
/// when it is replaced.
#[derive(Clone)]
pub struct TextSchema {
    schema: Schema,
    id: Field,
    domain: Field,
    summary: Field,
    extra_info: Field,
    script: Field,
}

impl TextSchema {
    pub fn new() -> Self {
        let mut schema_builder = Schema::builder();

        let id = schema_builder.add_text_field(FIELD_ID, STRING | STORED);
        let domain = schema_builder.add_text_field(FIELD_DOMAIN, TEXT);
        let summary = schema_builder.add_text_field(FIELD_SUMMARY, TEXT);
        let extra_info = schema_builder.add_text_field(FIELD_EXTRA_INFO, TEXT);
        let script = schema_builder.add_text_field(FIELD_SCRIPT, TEXT);

        let schema = schema_builder.build();

        Self {
            schema,
            id,
            domain,
            summary,
            extra_info,
            script,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl Default for TextSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// A ranked lexical hit: record id plus the engine-native score.
#[derive(Debug, Clone)]
pub struct TextHit {
    pub id: String,
    pub score: f32,
}

/// Lexical index over the searchable solution fields.
pub struct TextIndex {
    index: Index,
    schema: TextSchema,
    writer: IndexWriter,
    reader: IndexReader,
}

impl TextIndex {
    /// Create or open the text index under the given directory.
    pub fn open_or_create(path: &Path) -> Result<Self, StoreError> {
        let index_path = path.join(TEXT_INDEX_DIR);
        let schema = TextSchema::new();

        let index = if index_path.exists() {
            info!("Opening existing text index at {:?}", index_path);
            Index::open_in_dir(&index_path)?
        } else {
            info!("Creating new text index at {:?}", index_path);
            std::fs::create_dir_all(&index_path)?;
            Index::create_in_dir(&index_path, schema.schema().clone())?
        };

        // 50MB writer heap
        let writer = index.writer(50_000_000)?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()?;

        Ok(Self {
            index,
            schema,
            writer,
            reader,
        })
    }

    /// Check whether an index directory exists at the given path.
    pub fn exists(path: &Path) -> bool {
        path.join(TEXT_INDEX_DIR).exists()
    }

    /// Add one solution to the index.
    pub fn add_solution(&mut self, solution: &Solution) -> Result<(), StoreError> {
        self.writer.add_document(doc!(
            self.schema.id => solution.id.as_str(),
            self.schema.domain => solution.domain.as_str(),
            self.schema.summary => solution.summary.as_str(),
            self.schema.extra_info => solution.extra_info.as_str(),
            self.schema.script => solution.script.as_str(),
        ))?;
        debug!(id = %solution.id, "Added solution to text index");
        Ok(())
    }

    /// Remove a solution before re-adding its updated form.
    pub fn delete_solution(&mut self, id: &str) {
        let term = Term::from_field_text(self.schema.id, id);
        self.writer.delete_term(term);
        debug!(id = id, "Deleted solution from text index");
    }

    /// Commit pending changes and reload the reader.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        self.writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    /// Search across summary, domain, extra info and script.
    ///
    /// Returns ranked `(id, score)` pairs; the caller hydrates full records.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<TextHit>, StoreError> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let query_parser = QueryParser::for_index(
            &self.index,
            vec![
                self.schema.summary,
                self.schema.domain,
                self.schema.extra_info,
                self.schema.script,
            ],
        );

        let parsed_query = match query_parser.parse_query(query) {
            Ok(q) => q,
            Err(e) => {
                warn!("Failed to parse query '{}': {}", query, e);
                // Strip the operators tantivy chokes on and retry
                let escaped = query.replace(
                    [
                        '(', ')', '[', ']', '{', '}', '"', '\'', ':', '\\', '/', '^', '~', '*',
                        '?', '!', '+', '-',
                    ],
                    " ",
                );
                query_parser.parse_query(&escaped)?
            }
        };

        let top_docs = searcher.search(&parsed_query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let retrieved_doc: TantivyDocument = searcher.doc(doc_address)?;
            let id = retrieved_doc
                .get_first(self.schema.id)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            if id.is_empty() {
                continue;
            }
            hits.push(TextHit { id, score });
        }

        debug!("Text search returned {} hits", hits.len());
        Ok(hits)
    }
}
