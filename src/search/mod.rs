//! Full-text search over store documents.
//!
//! This module provides TF-IDF based search: tokenization, field-weighted
//! scoring, the inverted index, and query handling.

pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

pub use index::{IndexStats, SearchIndex, TitleCollision};
pub use query::SearchHit;
pub use scoring::relative_relevance;
