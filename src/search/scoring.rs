//! Relevance scoring and cross-strategy score normalization.
//!
//! Vector similarity, Tantivy scores and scan scores live on different
//! scales. Everything is mapped onto one combined scale before ranking:
//! similarities stretch to 0-10, lexical scores are damped, and a record
//! surfaced by both strategies keeps its vector score plus a fraction of
//! its lexical score.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use super::traits::{SearchHit, SearchType};
use crate::model::Solution;

/// Vector similarities land in 0-1; stretch them to the combined scale.
const VECTOR_SCALE: f32 = 10.0;

/// Ceiling of the combined scale.
const COMBINED_CAP: f32 = 10.0;

/// Damping applied to hits only a text strategy found.
const TEXT_ONLY_WEIGHT: f32 = 0.8;

/// Fraction of the lexical score added when a vector hit is corroborated
/// by a text hit.
const TEXT_BOOST_WEIGHT: f32 = 0.3;

/// Multiplier for whole-phrase occurrences.
const PHRASE_WEIGHT: f32 = 2.0;

/// Multiplier for individual word occurrences.
const WORD_WEIGHT: f32 = 0.5;

/// Words must be strictly longer than this to count.
const MIN_WORD_LEN: usize = 2;

/// Flat bonus for records created within the recency window.
const RECENCY_BONUS: f32 = 1.0;
const RECENCY_WINDOW_DAYS: i64 = 30;

/// Weights of the searchable fields, most identifying first.
const DOMAIN_WEIGHT: f32 = 5.0;
const SUMMARY_WEIGHT: f32 = 3.0;
const EXTRA_INFO_WEIGHT: f32 = 2.0;
const PREREQUISITES_WEIGHT: f32 = 1.5;
const SCRIPT_WEIGHT: f32 = 1.0;

/// Field-weighted lexical relevance of a solution for a query.
///
/// Case-insensitive. Whole-phrase occurrences count at double weight, each
/// query word longer than [`MIN_WORD_LEN`] characters at half weight, and
/// records created within the last [`RECENCY_WINDOW_DAYS`] days get a flat
/// bonus. `now` is injected so rankings are reproducible.
pub fn lexical_score(query: &str, solution: &Solution, now: DateTime<Utc>) -> f32 {
    let phrase = query.trim().to_lowercase();
    if phrase.is_empty() {
        return 0.0;
    }

    let words: Vec<&str> = phrase
        .split_whitespace()
        .filter(|w| w.len() > MIN_WORD_LEN)
        .collect();

    let fields: [(&str, f32); 5] = [
        (solution.domain.as_str(), DOMAIN_WEIGHT),
        (solution.summary.as_str(), SUMMARY_WEIGHT),
        (solution.extra_info.as_str(), EXTRA_INFO_WEIGHT),
        (solution.prerequisites.as_str(), PREREQUISITES_WEIGHT),
        (solution.script.as_str(), SCRIPT_WEIGHT),
    ];

    let mut score = 0.0_f32;
    for (text, weight) in fields {
        let haystack = text.to_lowercase();

        let phrase_hits = haystack.matches(&phrase).count() as f32;
        score += phrase_hits * weight * PHRASE_WEIGHT;

        for word in &words {
            let word_hits = haystack.matches(word).count() as f32;
            score += word_hits * weight * WORD_WEIGHT;
        }
    }

    if now.signed_duration_since(solution.created_at) < Duration::days(RECENCY_WINDOW_DAYS) {
        score += RECENCY_BONUS;
    }

    (score * 100.0).round() / 100.0
}

impl SearchHit {
    /// Hit surfaced by vector similarity.
    pub fn from_vector_score(solution: Solution, similarity: f32) -> Self {
        let combined = (similarity * VECTOR_SCALE).min(COMBINED_CAP);
        Self {
            solution,
            search_type: SearchType::Vector,
            vector_score: Some(similarity),
            text_score: None,
            combined_score: combined,
            sources: vec![SearchType::Vector],
        }
    }

    /// Hit surfaced by the lexical index.
    pub fn from_text_score(solution: Solution, score: f32) -> Self {
        Self {
            solution,
            search_type: SearchType::Text,
            vector_score: None,
            text_score: Some(score),
            combined_score: score * TEXT_ONLY_WEIGHT,
            sources: vec![SearchType::Text],
        }
    }

    /// Hit surfaced by the regex scan. The lexical score is already on the
    /// combined scale, so it passes through undamped.
    pub fn from_scan_score(solution: Solution, score: f32) -> Self {
        Self {
            solution,
            search_type: SearchType::Regex,
            vector_score: None,
            text_score: Some(score),
            combined_score: score,
            sources: vec![SearchType::Regex],
        }
    }
}

/// Merge vector and text hit lists into one ranking.
///
/// A record present in both lists keeps its vector-derived combined score
/// plus [`TEXT_BOOST_WEIGHT`] of its raw lexical score, and is retagged
/// `Hybrid`. Results are unique by id; on equal combined scores the
/// vector-sourced hit ranks first.
pub fn merge_hybrid(
    vector_hits: Vec<SearchHit>,
    text_hits: Vec<SearchHit>,
    limit: usize,
) -> Vec<SearchHit> {
    let mut merged: Vec<SearchHit> = Vec::with_capacity(vector_hits.len() + text_hits.len());
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for hit in vector_hits {
        if by_id.contains_key(&hit.solution.id) {
            continue;
        }
        by_id.insert(hit.solution.id.clone(), merged.len());
        merged.push(hit);
    }

    for hit in text_hits {
        match by_id.get(&hit.solution.id) {
            Some(&idx) => {
                let entry = &mut merged[idx];
                // One boost per id even if the text list repeats it.
                if entry.sources.contains(&SearchType::Text) {
                    continue;
                }
                let raw = hit.text_score.unwrap_or(0.0);
                entry.combined_score += raw * TEXT_BOOST_WEIGHT;
                entry.text_score = Some(raw);
                entry.search_type = SearchType::Hybrid;
                entry.sources.push(SearchType::Text);
            }
            None => {
                by_id.insert(hit.solution.id.clone(), merged.len());
                merged.push(hit);
            }
        }
    }

    // Stable sort keeps vector-sourced hits ahead of text-sourced ones on ties.
    merged.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}
