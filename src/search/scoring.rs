//! Search relevance and ranking algorithms.
//!
//! Field weights and the per-field TF-IDF variant used when finalizing the index, plus
//! the relative-relevance helper used when rendering results.

/// Document field a term was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Title,
    Tags,
    Categories,
    Excerpt,
}

impl Field {
    pub(crate) const ALL: [Self; 4] = [Self::Title, Self::Tags, Self::Categories, Self::Excerpt];

    /// Position of the field in per-field count arrays.
    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Title => 0,
            Self::Tags => 1,
            Self::Categories => 2,
            Self::Excerpt => 3,
        }
    }

    /// Base score multiplied into every occurrence of a term in this field.
    ///
    /// Title matches rank above tag/category matches, which rank above excerpt matches.
    pub(crate) const fn weight(self) -> f32 {
        match self {
            Self::Title => 2.0,
            Self::Tags | Self::Categories => 1.5,
            Self::Excerpt => 1.0,
        }
    }
}

/// Smoothed inverse document frequency: `ln(1 + total_docs / doc_freq)`.
///
/// Strictly positive whenever the term occurs at all, so a term shared by every
/// document (or a one-document index) still produces a nonzero score.
pub(crate) fn inverse_document_frequency(total_docs: usize, doc_freq: usize) -> f32 {
    if doc_freq == 0 {
        return 0.0;
    }
    (1.0 + total_docs as f32 / doc_freq as f32).ln()
}

/// Contribution of one field to a term's score: `weight * (1 + s) / 2`.
///
/// `s = tf / (tf + 1)` with `tf = count / max(len / avg_len, 0.5)`, so `s` lies in
/// `(0, 1)` and every field scores within `[weight / 2, weight)`. One title
/// occurrence (at least 1.0) therefore outweighs any number of excerpt
/// occurrences (below 1.0), whatever the field lengths.
pub(crate) fn field_score(
    field: Field,
    count: usize,
    field_length: usize,
    avg_field_length: f32,
) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let avg = if avg_field_length > 0.0 {
        avg_field_length
    } else {
        1.0
    };
    // Clamp to prevent over-rewarding very short fields
    let length_norm = (field_length.max(1) as f32 / avg).max(0.5);
    let tf = count as f32 / length_norm;
    let saturation = tf / (tf + 1.0);
    field.weight() * (1.0 + saturation) / 2.0
}

/// Relevance of `score` relative to the best score in a result set, as a percentage.
pub fn relative_relevance(score: f32, max_score: f32) -> u8 {
    if max_score <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = ((score / max_score) * 100.0).round().clamp(0.0, 100.0) as u8;
    percent
}
