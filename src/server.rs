//! MCP server exposing the site search index as tools.

use crate::state::SearchState;
use crate::tools::reload::{IndexInfoRequest, ReloadRequest, handle_index_info, handle_reload};
use crate::tools::search::{SearchRequest, handle_search};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for searching a generated site
#[derive(Clone)]
pub struct SearchServer {
    /// Shared search state (active index, store location)
    state: Arc<SearchState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl SearchServer {
    /// Create a server over an existing search state.
    pub fn new(state: Arc<SearchState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<SearchState> {
        &self.state
    }

    #[tool(
        description = "Search the site's pages, member profiles and publications using TF-IDF full-text search. Matches titles, excerpts, tags and categories, returning results ranked by relevance.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "Rebuild the search index from the generated store (lunr-store.js or a JSON array). Optionally switch to a different store path. The current index stays active if the new store is invalid.",
        input_schema = inline_schema_for_type::<ReloadRequest>()
    )]
    async fn reload(
        &self,
        Parameters(request): Parameters<ReloadRequest>,
    ) -> std::result::Result<String, String> {
        handle_reload(&self.state, request).await
    }

    #[tool(
        description = "Show the active search index: store location, document and term counts, and titles shared by several documents.",
        input_schema = inline_schema_for_type::<IndexInfoRequest>()
    )]
    async fn index_info(
        &self,
        Parameters(request): Parameters<IndexInfoRequest>,
    ) -> std::result::Result<String, String> {
        handle_index_info(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "sitesearch-mcp: Full-text search over a generated static site. \
                 The index is built from the site's lunr-store.js and rebuilt when it changes. \
                 Use search to find pages, index_info to inspect the index, \
                 and reload to rebuild it or point at another store."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline enum definitions instead of $ref patterns. This ensures MCP Inspector
/// displays enums as dropdown widgets rather than raw JSON input fields.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
