//! Text tokenization and stemming utilities for search indexing.

use ahash::AHasher;
use rust_stemmers::Stemmer;
use std::hash::{Hash, Hasher};

/// Minimum token length for indexing. Set to 1 so initials and single digits survive.
const MIN_TOKEN_LENGTH: usize = 1;

/// Common English stop words to filter out from indexing.
/// These high-frequency words add little value to search relevance.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "or", "that", "the", "to", "was", "will", "with",
];

/// Folds a character to its unaccented form, appending the result to `out`.
///
/// Covers the Latin-1 and Latin Extended-A letters that appear in author and
/// place names. Anything else is passed through unchanged.
fn fold_char(c: char, out: &mut String) {
    let folded = match c {
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'ø' | 'Ø' => "o",
        'ł' | 'Ł' => "l",
        'đ' | 'Đ' => "d",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' => "I",
        'ñ' | 'ń' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ō' | 'Ő' => "O",
        'ř' => "r",
        'Ř' => "R",
        'ś' | 'š' | 'ş' => "s",
        'Ś' | 'Š' | 'Ş' => "S",
        'ť' | 'ţ' => "t",
        'Ť' | 'Ţ' => "T",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' | 'Ÿ' => "Y",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        _ => {
            out.push(c);
            return;
        }
    };
    out.push_str(folded);
}

/// Folds diacritics while preserving case, so CamelCase boundaries survive.
pub(crate) fn fold_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        fold_char(c, &mut out);
    }
    out
}

/// Tokenizes text into searchable terms with stemming and case-aware splitting.
///
/// Letters and digits are word characters; every other character ends a word.
/// Within a word the state machine also splits on:
/// - **CamelCase**: "BreizhCrops" → ["Breizh", "Crops", "BreizhCrops"]
/// - **snake_case**: "time_series" → ["time", "series", "timeseries"]
/// - **hyphen-case**: "spatio-temporal" → ["spatio", "temporal", "spatiotemporal"]
///
/// The state machine maintains two pointers:
/// - `word_start`: Start of the complete word (e.g., "BreizhCrops")
/// - `subword_start`: Start of the current sub-component (e.g., "Crops")
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let text = fold_diacritics(text);
    let text = text.as_str();
    let mut tokens = vec![];

    let mut last_case = None; // None for non-letters, Some(is_uppercase) for letters
    let mut word_start = 0;
    let mut subword_start = 0;
    let mut has_delimiter = false; // word contains '-' or '_'
    let mut in_word = false;
    let mut subword_start_next_char = false;

    for (i, c) in text.char_indices() {
        let is_delimiter = c == '-' || c == '_';
        let is_word_char = c.is_alphanumeric();

        if !in_word {
            if !is_word_char {
                continue;
            }
            word_start = i;
            subword_start = i;
            has_delimiter = false;
            subword_start_next_char = false;
            last_case = None;
            in_word = true;
        }

        if subword_start_next_char && is_word_char {
            subword_start = i;
            subword_start_next_char = false;
        }

        let current_case = c.is_alphabetic().then(|| c.is_uppercase());
        let case_change = last_case == Some(false) && current_case == Some(true);
        last_case = current_case;

        if is_delimiter {
            // **Snake_case / hyphen-case boundary**: close the current subword
            if !subword_start_next_char && i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                index_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            has_delimiter = true;
            subword_start_next_char = true;
        } else if !is_word_char {
            // **Word boundary**: emit the last subword and the complete word
            finish_word(
                text,
                word_start,
                subword_start,
                i,
                has_delimiter,
                subword_start_next_char,
                &mut tokens,
                stemmer,
            );
            in_word = false;
        } else if case_change {
            // **CamelCase boundary**: "breizh" → "C" in "BreizhCrops"
            if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                index_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            subword_start = i;
        }
    }

    if in_word {
        finish_word(
            text,
            word_start,
            subword_start,
            text.len(),
            has_delimiter,
            subword_start_next_char,
            &mut tokens,
            stemmer,
        );
    }

    tokens
}

/// Emits the trailing subword and the complete word ending at `end`.
///
/// Compound words have their `-`/`_` delimiters removed before indexing.
#[allow(clippy::too_many_arguments)]
fn finish_word(
    text: &str,
    word_start: usize,
    subword_start: usize,
    end: usize,
    has_delimiter: bool,
    trailing_delimiter: bool,
    tokens: &mut Vec<String>,
    stemmer: &Stemmer,
) {
    let is_compound = subword_start != word_start || has_delimiter;

    if is_compound
        && !trailing_delimiter
        && end.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH
    {
        index_token(&text[subword_start..end], tokens, stemmer);
    }

    let word = &text[word_start..end];
    if has_delimiter {
        // A lone subword with a trailing delimiter ("trailing-") was already
        // emitted at the delimiter and equals the joined form
        let single_subword = subword_start == word_start;
        let joined: String = word.chars().filter(|c| *c != '-' && *c != '_').collect();
        if !single_subword && joined.len() >= MIN_TOKEN_LENGTH {
            index_token(&joined, tokens, stemmer);
        }
    } else if word.len() >= MIN_TOKEN_LENGTH {
        index_token(word, tokens, stemmer);
    }
}

/// Add a token using proper stemming algorithm, filtering out stop words.
pub(crate) fn index_token(token: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    let lowercase = token.to_lowercase();

    if STOP_WORDS.contains(&lowercase.as_str()) {
        return;
    }

    let stemmed = stemmer.stem(&lowercase);
    tokens.push(stemmed.into_owned());
}

/// Hashes a term for fast lookup (case-insensitive).
pub(crate) fn hash_term(term: &str) -> u64 {
    let mut hasher = AHasher::default();
    term.to_lowercase().hash(&mut hasher);
    hasher.finish()
}
