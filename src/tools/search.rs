//! TF-IDF search handler for finding site documents.

use crate::search::{SearchHit, SearchIndex, relative_relevance};
use crate::state::SearchState;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;

/// Number of "did you mean" titles offered when a query has no matches.
const MAX_SUGGESTIONS: usize = 5;

/// DO NOT add doc comments to individual variants - this causes schemars to generate
/// `oneOf` schemas instead of simple `enum` arrays, breaking MCP client enum handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Free-text query matched against titles, excerpts, tags and categories
    pub query: String,
    /// Maximum number of results to return (default: 10)
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,
    /// Output format: human-readable text or a JSON array of hits
    #[serde(default)]
    pub format: OutputFormat,
}

#[allow(clippy::unnecessary_wraps)]
const fn default_limit() -> Option<usize> {
    Some(10)
}

/// Execute a search against the active index.
pub async fn handle_search(
    state: &Arc<SearchState>,
    request: SearchRequest,
) -> Result<String, String> {
    let Some(index) = state.current().await else {
        return Err("No search index loaded.\n\n\
             Use the reload tool with the path to a generated lunr-store.js \
             (or start the server with --store)."
            .to_string());
    };

    let hits = index.search(&request.query, request.limit);

    match request.format {
        OutputFormat::Json => serde_json::to_string_pretty(&hits)
            .map_err(|e| format!("Failed to serialize results: {}", e)),
        OutputFormat::Text if hits.is_empty() => Ok(format_no_results(&index, &request.query)),
        OutputFormat::Text => Ok(format_search_results(&hits, &request.query)),
    }
}

/// Format search results into a readable string output.
pub fn format_search_results(hits: &[SearchHit], query: &str) -> String {
    let mut output = format!("Search results for '{}':\n\n", query);

    let max_score = hits.first().map_or(1.0, |hit| hit.score);

    for (idx, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {} ({}) - relevance: {}%",
            idx + 1,
            hit.title,
            hit.url,
            relative_relevance(hit.score, max_score)
        );

        if !hit.excerpt.is_empty() {
            let _ = writeln!(output, "   {}", hit.excerpt);
        }

        output.push('\n');
    }

    output
}

/// Explain an empty result, offering similar titles when there are any.
fn format_no_results(index: &SearchIndex, query: &str) -> String {
    let mut msg = format!("No results found for '{}'.\n\n", query);

    if query.trim().is_empty() {
        msg.push_str("The query is empty. Enter one or more words to search for.\n");
        return msg;
    }

    let suggestions = index.suggest(query, MAX_SUGGESTIONS);
    if !suggestions.is_empty() {
        msg.push_str("Did you mean one of these?\n\n");
        for (doc, _) in suggestions {
            let _ = writeln!(msg, "• {} ({})", doc.title, doc.url);
        }
        msg.push('\n');
    }

    msg.push_str("Search tips:\n");
    msg.push_str("• Try a shorter or more general term\n");
    msg.push_str("• Search uses stemming: 'mapping' matches 'map'\n");
    msg.push_str("• Common words like 'the' or 'of' are ignored\n");

    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use assert2::{check, let_assert};

    async fn member_state() -> Arc<SearchState> {
        let state = Arc::new(SearchState::new());
        let docs = vec![
            Document::new("Claire", "/members/claire/"),
            Document::new("Marc", "/members/marc/"),
        ];
        let_assert!(Ok(_) = state.rebuild(docs).await);
        state
    }

    fn request(query: &str, format: OutputFormat) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            limit: Some(10),
            format,
        }
    }

    #[tokio::test]
    async fn test_search_without_index() {
        let state = Arc::new(SearchState::new());
        let_assert!(Err(msg) = handle_search(&state, request("claire", OutputFormat::Text)).await);
        check!(msg.contains("No search index loaded"));
    }

    #[tokio::test]
    async fn test_search_text_output() {
        let state = member_state().await;
        let_assert!(Ok(output) = handle_search(&state, request("Claire", OutputFormat::Text)).await);
        check!(output.contains("1. Claire (/members/claire/) - relevance: 100%"));
        check!(!output.contains("Marc"));
    }

    #[tokio::test]
    async fn test_search_json_output() {
        let state = member_state().await;
        let_assert!(Ok(output) = handle_search(&state, request("marc", OutputFormat::Json)).await);
        let_assert!(Ok(hits) = serde_json::from_str::<Vec<SearchHit>>(&output));
        check!(hits.len() == 1);
        check!(hits[0].url == "/members/marc/");
        check!(hits[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_search_suggestions() {
        let state = member_state().await;
        let_assert!(Ok(output) = handle_search(&state, request("Clare", OutputFormat::Text)).await);
        check!(output.contains("No results found"));
        check!(output.contains("Did you mean"));
        check!(output.contains("/members/claire/"));
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let state = member_state().await;
        let_assert!(Ok(output) = handle_search(&state, request("  ", OutputFormat::Text)).await);
        check!(output.contains("The query is empty"));
    }

    #[test]
    fn test_request_defaults() {
        let_assert!(Ok(request) = serde_json::from_str::<SearchRequest>(r#"{"query": "crop"}"#));
        check!(request.limit == Some(10));
        check!(request.format == OutputFormat::Text);
    }
}
