//! TF-IDF inverted index over store documents.

use ahash::AHashMap;
use rapidfuzz::distance::jaro_winkler;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, hash_map::Entry};

use super::query::{SearchHit, query_terms};
use super::scoring::{Field, field_score, inverse_document_frequency};
use super::tokenize::{fold_diacritics, hash_term, tokenize_and_stem};
use crate::document::Document;
use crate::error::BuildError;

/// Term hash for fast lookup
type TermHash = u64;

/// Minimum Jaro-Winkler similarity for a title to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// One document's entry in a term's postings list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Posting {
    /// Position of the document in the original collection
    pub(crate) doc: usize,
    /// Field-weighted occurrence count of the term in the document
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) frequency: f32,
    /// Final TF-IDF contribution of the term to the document's score
    pub(crate) score: f32,
}

/// Counts describing a built index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub postings: usize,
}

/// Documents whose titles are identical ignoring case.
///
/// Titles need not be unique, so collisions are reported rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleCollision {
    pub title: String,
    pub urls: Vec<String>,
}

/// A built, immutable search index.
///
/// Construct with [`SearchIndex::build`]; a new collection means a new index.
#[derive(Debug)]
pub struct SearchIndex {
    /// Documents in their original order (ties in ranking follow this order)
    documents: Vec<Document>,
    /// Map from url to document position
    urls: AHashMap<String, usize>,
    /// Map from term hash to postings, sorted by document position
    terms: HashMap<TermHash, Vec<Posting>>,
    /// Total number of term-document pairs
    postings: usize,
    collisions: Vec<TitleCollision>,
}

impl SearchIndex {
    /// Builds an index over `documents`.
    ///
    /// Fails with [`BuildError::DuplicateUrl`] when two documents share a url,
    /// or [`BuildError::MalformedRecord`] when a url is blank; nothing is
    /// indexed in either case.
    pub fn build(documents: Vec<Document>) -> Result<Self, BuildError> {
        let start = std::time::Instant::now();

        let mut urls: AHashMap<String, usize> = AHashMap::with_capacity(documents.len());
        for (position, doc) in documents.iter().enumerate() {
            if doc.url.trim().is_empty() {
                return Err(BuildError::MalformedRecord {
                    index: position,
                    reason: "field `url` is blank".to_string(),
                });
            }
            match urls.entry(doc.url.clone()) {
                Entry::Occupied(entry) => {
                    return Err(BuildError::DuplicateUrl {
                        url: doc.url.clone(),
                        first: *entry.get(),
                        second: position,
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
            }
        }

        let mut builder = TermBuilder::new(documents.len());
        for (position, doc) in documents.iter().enumerate() {
            builder.add_document(position, doc);
        }
        let (terms, postings) = builder.finalize();

        let collisions = find_title_collisions(&documents);
        for collision in &collisions {
            tracing::warn!(
                "Title '{}' is shared by {} documents: {}",
                collision.title,
                collision.urls.len(),
                collision.urls.join(", ")
            );
        }

        let index = Self {
            documents,
            urls,
            terms,
            postings,
            collisions,
        };

        tracing::info!(
            "Built search index: {} unique terms, {} documents, {} term-document pairs in {:?}",
            index.terms.len(),
            index.documents.len(),
            index.postings,
            start.elapsed()
        );

        Ok(index)
    }

    /// Validates raw JSON records and builds an index over them.
    ///
    /// Fails with [`BuildError::MalformedRecord`] on the first invalid record,
    /// or [`BuildError::DuplicateUrl`] as in [`SearchIndex::build`].
    pub fn from_values(values: Vec<Value>) -> Result<Self, BuildError> {
        let documents = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Document::from_value(index, value))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(documents)
    }

    /// Ranks documents against a free-text query.
    ///
    /// Returns at most `limit` results (unbounded when `None`), highest score
    /// first, ties in original document order. Queries with no indexable terms
    /// return an empty list.
    pub fn query(&self, text: &str, limit: Option<usize>) -> Vec<(&Document, f32)> {
        if limit == Some(0) {
            return vec![];
        }

        let tokens = query_terms(text);
        if tokens.is_empty() {
            return vec![];
        }

        // Collect results from all tokens, combining scores for documents that match multiple
        let mut combined_scores: AHashMap<usize, f32> = AHashMap::new();
        for token in &tokens {
            if let Some(postings) = self.terms.get(&hash_term(token)) {
                for posting in postings {
                    *combined_scores.entry(posting.doc).or_insert(0.0) += posting.score;
                }
            }
        }

        let mut results: Vec<_> = combined_scores.into_iter().collect();
        results.sort_by(|(doc_a, a), (doc_b, b)| b.total_cmp(a).then(doc_a.cmp(doc_b)));

        results
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(doc, score)| (&self.documents[doc], score))
            .collect()
    }

    /// Like [`SearchIndex::query`], returning owned hits for the UI layer.
    pub fn search(&self, text: &str, limit: Option<usize>) -> Vec<SearchHit> {
        self.query(text, limit)
            .into_iter()
            .map(|(doc, score)| SearchHit::new(doc, score))
            .collect()
    }

    /// Finds documents whose title, or a word of it, resembles `text`.
    ///
    /// Used for "did you mean" output when a query has no matches.
    pub fn suggest(&self, text: &str, limit: usize) -> Vec<(&Document, f64)> {
        let needle = fold_diacritics(text.trim()).to_lowercase();
        if needle.is_empty() {
            return vec![];
        }

        let mut scored: Vec<(usize, f64)> = self
            .documents
            .iter()
            .enumerate()
            .filter_map(|(position, doc)| {
                let title = fold_diacritics(&doc.title).to_lowercase();
                let whole = jaro_winkler::similarity(needle.chars(), title.chars());
                let best = title
                    .split_whitespace()
                    .map(|word| jaro_winkler::similarity(needle.chars(), word.chars()))
                    .fold(whole, f64::max);
                (best > SUGGESTION_THRESHOLD).then_some((position, best))
            })
            .collect();

        scored.sort_by(|(pos_a, a), (pos_b, b)| b.total_cmp(a).then(pos_a.cmp(pos_b)));
        scored
            .into_iter()
            .take(limit)
            .map(|(position, score)| (&self.documents[position], score))
            .collect()
    }

    /// Urls of the documents containing `term`, in document order.
    ///
    /// `term` must tokenize to exactly one token; compounds such as
    /// "BreizhCrops" yield several and match nothing here.
    #[cfg(test)]
    pub(crate) fn urls_for_term(&self, term: &str) -> Vec<&str> {
        let Some(token) = single_token(term) else {
            return vec![];
        };

        self.terms
            .get(&hash_term(&token))
            .map(|postings| {
                postings
                    .iter()
                    .map(|posting| self.documents[posting.doc].url.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Field-weighted frequency of a single-token `term` in the document at `url`.
    #[cfg(test)]
    pub(crate) fn term_frequency(&self, url: &str, term: &str) -> Option<f32> {
        let position = *self.urls.get(url)?;
        let token = single_token(term)?;

        self.terms
            .get(&hash_term(&token))?
            .iter()
            .find(|posting| posting.doc == position)
            .map(|posting| posting.frequency)
    }

    /// Look up a document by url.
    pub fn get(&self, url: &str) -> Option<&Document> {
        self.urls.get(url).map(|&position| &self.documents[position])
    }

    /// Documents in their original order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.documents.len(),
            terms: self.terms.len(),
            postings: self.postings,
        }
    }

    pub fn title_collisions(&self) -> &[TitleCollision] {
        &self.collisions
    }
}

/// The only token of `term`, or `None` when it yields zero or several.
#[cfg(test)]
fn single_token(term: &str) -> Option<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    let mut tokens = tokenize_and_stem(term, &stemmer).into_iter();
    let token = tokens.next()?;
    tokens.next().is_none().then_some(token)
}

/// Per-field counts, indexed by [`Field::slot`].
type FieldCounts = [usize; Field::ALL.len()];

/// Builder for accumulating term frequencies before TF-IDF finalization.
struct TermBuilder {
    /// Flat map from (term_hash, doc) → occurrence count per field
    term_docs: AHashMap<(TermHash, usize), FieldCounts>,
    /// Token count of every field of every document, for per-field length normalization
    field_lengths: Vec<FieldCounts>,
    /// Reusable stemmer instance for English language stemming
    stemmer: Stemmer,
}

impl TermBuilder {
    fn new(document_count: usize) -> Self {
        Self {
            term_docs: AHashMap::default(),
            field_lengths: vec![[0; Field::ALL.len()]; document_count],
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Indexes every searchable field of a document.
    fn add_document(&mut self, doc: usize, document: &Document) {
        self.add_terms(&document.title, doc, Field::Title);
        self.add_terms(&document.excerpt, doc, Field::Excerpt);
        for tag in &document.tags {
            self.add_terms(tag, doc, Field::Tags);
        }
        for category in &document.categories {
            self.add_terms(category, doc, Field::Categories);
        }
    }

    /// Extracts and adds terms from text, counting occurrences per field.
    fn add_terms(&mut self, text: &str, doc: usize, field: Field) {
        let words = tokenize_and_stem(text, &self.stemmer);
        if words.is_empty() {
            return;
        }

        let mut word_counts: AHashMap<String, usize> = AHashMap::with_capacity(words.len());
        for word in words {
            *word_counts.entry(word).or_insert(0) += 1;
        }

        self.field_lengths[doc][field.slot()] += word_counts.values().sum::<usize>();

        for (word, count) in word_counts {
            let counts = self
                .term_docs
                .entry((hash_term(&word), doc))
                .or_insert([0; Field::ALL.len()]);
            counts[field.slot()] += count;
        }
    }

    /// Calculates IDF scores and produces the final postings.
    /// Returns the postings map and the total number of term-document pairs.
    fn finalize(self) -> (HashMap<TermHash, Vec<Posting>>, usize) {
        let total_docs = self.field_lengths.len();
        let avg_field_lengths = Field::ALL.map(|field| {
            let total: usize = self.field_lengths.iter().map(|lengths| lengths[field.slot()]).sum();
            if total_docs > 0 {
                total as f32 / total_docs as f32
            } else {
                1.0
            }
        });

        let total_pairs = self.term_docs.len();

        // Group flat term_docs by term_hash
        let mut grouped: HashMap<TermHash, Vec<(usize, FieldCounts)>> = HashMap::new();
        for ((term_hash, doc), counts) in self.term_docs {
            grouped.entry(term_hash).or_default().push((doc, counts));
        }

        let terms = grouped
            .into_iter()
            .map(|(term_hash, docs)| {
                let idf = inverse_document_frequency(total_docs, docs.len());
                let mut postings: Vec<Posting> = docs
                    .into_iter()
                    .map(|(doc, counts)| {
                        let mut frequency = 0.0;
                        let mut weight = 0.0;
                        for field in Field::ALL {
                            let count = counts[field.slot()];
                            frequency += count as f32 * field.weight();
                            weight += field_score(
                                field,
                                count,
                                self.field_lengths[doc][field.slot()],
                                avg_field_lengths[field.slot()],
                            );
                        }
                        Posting {
                            doc,
                            frequency,
                            score: weight * idf,
                        }
                    })
                    .collect();
                postings.sort_by_key(|posting| posting.doc);
                (term_hash, postings)
            })
            .collect();

        (terms, total_pairs)
    }
}

/// Groups documents whose titles match ignoring case, in first-seen order.
fn find_title_collisions(documents: &[Document]) -> Vec<TitleCollision> {
    let mut groups: AHashMap<String, Vec<usize>> = AHashMap::new();
    for (position, doc) in documents.iter().enumerate() {
        if doc.title.is_empty() {
            continue;
        }
        groups.entry(doc.title_key()).or_default().push(position);
    }

    let mut collisions: Vec<Vec<usize>> = groups
        .into_values()
        .filter(|positions| positions.len() > 1)
        .collect();
    collisions.sort_by_key(|positions| positions[0]);

    collisions
        .into_iter()
        .map(|positions| TitleCollision {
            title: documents[positions[0]].title.clone(),
            urls: positions
                .iter()
                .map(|&position| documents[position].url.clone())
                .collect(),
        })
        .collect()
}
