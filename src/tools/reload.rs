//! Handlers for reloading the store and describing the active index.

use crate::search::SearchIndex;
use crate::state::SearchState;
use crate::store::expand_tilde;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ReloadRequest {
    /// Path to a generated lunr-store.js or JSON array (default: the configured store)
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct IndexInfoRequest {}

/// Rebuild the index from the store. The previous index stays active on failure.
pub async fn handle_reload(
    state: &Arc<SearchState>,
    request: ReloadRequest,
) -> Result<String, String> {
    let path = request
        .path
        .as_deref()
        .map(|p| PathBuf::from(&*expand_tilde(p)));

    let index = state
        .reload(path.as_deref())
        .await
        .map_err(|e| format!("Failed to reload search store: {}", e))?;

    let store = state.store_path().await;
    Ok(format_index_summary("Reloaded search index", store.as_deref(), &index))
}

/// Describe the active index.
pub async fn handle_index_info(
    state: &Arc<SearchState>,
    _request: IndexInfoRequest,
) -> Result<String, String> {
    let store = state.store_path().await;
    match state.current().await {
        Some(index) => Ok(format_index_summary(
            "Active search index",
            store.as_deref(),
            &index,
        )),
        None => {
            let mut msg = "No search index loaded.\n".to_string();
            if let Some(store) = store {
                let _ = writeln!(msg, "Configured store: {}", store.display());
            }
            Ok(msg)
        }
    }
}

/// Summarize an index: source, counts, and any title collisions.
pub fn format_index_summary(heading: &str, store: Option<&Path>, index: &SearchIndex) -> String {
    let stats = index.stats();
    let mut output = format!("{}\n\n", heading);

    if let Some(store) = store {
        let _ = writeln!(output, "Store: {}", store.display());
    }
    let _ = writeln!(output, "Documents: {}", stats.documents);
    let _ = writeln!(output, "Unique terms: {}", stats.terms);
    let _ = writeln!(output, "Term-document pairs: {}", stats.postings);

    let collisions = index.title_collisions();
    if !collisions.is_empty() {
        let _ = writeln!(output, "\nTitles shared by several documents ({}):", collisions.len());
        for collision in collisions {
            let _ = writeln!(output, "• {}", collision.title);
            for url in &collision.urls {
                let _ = writeln!(output, "    {}", url);
            }
        }
    }

    output
}
