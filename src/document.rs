//! Searchable document records and their validation.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One indexable record of the search store.
///
/// `url` is the primary key. Documents are immutable once built: the index is
/// rebuilt wholesale rather than patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub excerpt: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub url: String,
    pub teaser: Option<String>,
}

/// Wire shape of a store record before validation.
///
/// Required fields are optional here so that missing values surface as
/// `MalformedRecord` instead of a generic deserialization error.
#[derive(Debug, Deserialize)]
struct RawRecord {
    title: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    categories: Option<Vec<String>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    url: Option<String>,
    #[serde(default)]
    teaser: Option<String>,
}

impl Document {
    /// Create a document with only the required fields set.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: sanitize_text(&title.into()),
            excerpt: String::new(),
            categories: vec![],
            tags: vec![],
            url: url.into().trim().to_string(),
            teaser: None,
        }
    }

    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = sanitize_text(excerpt);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = sanitize_set(tags);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = sanitize_set(categories);
        self
    }

    /// Validate a JSON record at position `index` into a document.
    ///
    /// Fails when the record is not an object, a field has the wrong type,
    /// `title` or `url` is missing, or `url` is blank.
    pub fn from_value(index: usize, value: Value) -> Result<Self, BuildError> {
        let malformed = |reason: String| BuildError::MalformedRecord { index, reason };

        if !value.is_object() {
            return Err(malformed(format!(
                "expected an object, found {}",
                json_kind(&value)
            )));
        }

        let raw: RawRecord =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;

        let title = raw
            .title
            .ok_or_else(|| malformed("missing required field `title`".to_string()))?;
        let url = raw
            .url
            .ok_or_else(|| malformed("missing required field `url`".to_string()))?;

        let url = url.trim().to_string();
        if url.is_empty() {
            return Err(malformed("field `url` is blank".to_string()));
        }

        Ok(Self {
            title: sanitize_text(&title),
            excerpt: sanitize_text(raw.excerpt.as_deref().unwrap_or_default()),
            categories: sanitize_set(raw.categories.unwrap_or_default()),
            tags: sanitize_set(raw.tags.unwrap_or_default()),
            url,
            teaser: raw.teaser.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Case-insensitive title key used for collision diagnostics.
    pub fn title_key(&self) -> String {
        self.title.to_lowercase()
    }
}

/// Normalize a text field the way the site generator sanitizes front matter.
///
/// Non-breaking spaces become spaces, control and format characters are
/// dropped, whitespace runs collapse to a single space, and ends are trimmed.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        let c = if c == '\u{00A0}' { ' ' } else { c };

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_control() || is_format_char(c) {
            continue;
        }

        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// Sanitize each entry, dropping blanks and repeats while keeping first-seen order.
fn sanitize_set<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = ahash::AHashSet::new();
    items
        .into_iter()
        .map(|s| sanitize_text(s.as_ref()))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Invisible format characters (Unicode category Cf) that show up in scraped titles.
const fn is_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
    )
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(" ", "")]
    #[case("  Marc   Rußwurm ", "Marc Rußwurm")]
    #[case("line\nbreak\ttab", "line break tab")]
    #[case("zero\u{200B}width", "zerowidth")]
    #[case("non\u{00A0}breaking", "non breaking")]
    fn test_sanitize_text(#[case] input: &str, #[case] expected: &str) {
        check!(sanitize_text(input) == expected);
    }

    #[test]
    fn test_from_value_store_record() {
        let value = json!({
            "title": "Claire",
            "excerpt": " ",
            "categories": [],
            "tags": [],
            "url": "/members/claire/",
            "teaser": null
        });

        let_assert!(Ok(doc) = Document::from_value(0, value));
        check!(doc.title == "Claire");
        check!(doc.excerpt.is_empty());
        check!(doc.url == "/members/claire/");
        check!(doc.teaser.is_none());
    }

    #[test]
    fn test_from_value_defaults_optional_fields() {
        let_assert!(Ok(doc) = Document::from_value(0, json!({"title": "Marc", "url": "/m/"})));
        check!(doc.excerpt.is_empty());
        check!(doc.tags.is_empty());
        check!(doc.categories.is_empty());
    }

    #[rstest]
    #[case(json!({"url": "/a/"}), "title")]
    #[case(json!({"title": "A"}), "url")]
    #[case(json!({"title": null, "url": "/a/"}), "title")]
    #[case(json!({"title": "A", "url": "   "}), "blank")]
    #[case(json!({"title": 7, "url": "/a/"}), "invalid type")]
    #[case(json!("just a string"), "expected an object")]
    fn test_from_value_malformed(#[case] value: Value, #[case] reason_contains: &str) {
        let_assert!(Err(BuildError::MalformedRecord { index, reason }) = Document::from_value(3, value));
        check!(index == 3);
        check!(reason.contains(reason_contains), "reason was: {}", reason);
    }

    #[test]
    fn test_tags_deduplicated_in_order() {
        let doc = Document::new("T", "/t/").with_tags(["remote sensing", " ", "ml", "remote sensing"]);
        check!(doc.tags == vec!["remote sensing".to_string(), "ml".to_string()]);
    }
}
