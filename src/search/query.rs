//! Query-side types: result hits and query term extraction.

use ahash::AHashSet;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

use super::tokenize::tokenize_and_stem;
use crate::document::Document;

/// One ranked search result, as handed to the page/UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub score: f32,
}

impl SearchHit {
    pub(crate) fn new(document: &Document, score: f32) -> Self {
        Self {
            url: document.url.clone(),
            title: document.title.clone(),
            excerpt: document.excerpt.clone(),
            score,
        }
    }
}

/// Tokenizes a query with the indexing rules, dropping repeated terms.
///
/// Returns an empty list for empty, whitespace-only, or stop-word-only queries.
pub(crate) fn query_terms(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    let mut seen = AHashSet::new();
    tokenize_and_stem(text, &stemmer)
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}
