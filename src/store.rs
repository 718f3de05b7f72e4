//! Loading the generated search store (`lunr-store.js` or a plain JSON array).

use crate::document::Document;
use crate::error::LoadError;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Matches the JavaScript assignment wrapping the record array, e.g. `var store = `.
static ASSIGNMENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:var|let|const)\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=\s*")
        .expect("assignment pattern is valid")
});

/// Store locations produced by the static site generator, relative to the site root.
const STORE_CANDIDATES: &[&str] = &[
    "_site/assets/js/lunr/lunr-store.js",
    "assets/js/lunr/lunr-store.js",
    "lunr-store.js",
    "search.json",
];

/// Returns the JSON array text of a store file.
///
/// Accepts a bare JSON array or a `var|let|const <name> = [...];` assignment.
pub fn extract_array(text: &str) -> Result<&str, LoadError> {
    let text = text.trim_start_matches('\u{FEFF}');
    let body = match ASSIGNMENT_PREFIX.find(text) {
        Some(prefix) => &text[prefix.end()..],
        None => text,
    };

    let body = body.trim().trim_end_matches(';').trim_end();
    if body.starts_with('[') && body.ends_with(']') {
        Ok(body)
    } else {
        Err(LoadError::Syntax(
            "expected a JSON array or `var store = [...]` assignment".to_string(),
        ))
    }
}

/// Parses store text into validated documents, in store order.
pub fn parse_documents(text: &str) -> Result<Vec<Document>, LoadError> {
    let array = extract_array(text)?;
    let values: Vec<Value> =
        serde_json::from_str(array).map_err(|e| LoadError::Syntax(e.to_string()))?;

    let documents = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| Document::from_value(index, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(documents)
}

/// Reads and parses a store file.
pub async fn load_store(path: &Path) -> Result<Vec<Document>, LoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let documents = parse_documents(&text)?;
    debug!(
        "Loaded {} records from {}",
        documents.len(),
        path.display()
    );
    Ok(documents)
}

/// Looks for a generated store under `site_root`, trying the generator's usual locations.
pub fn discover_store(site_root: &Path) -> Option<PathBuf> {
    STORE_CANDIDATES
        .iter()
        .map(|candidate| site_root.join(candidate))
        .find(|path| path.is_file())
        .inspect(|path| debug!("Found search store at {}", path.display()))
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
