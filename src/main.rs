use anyhow::Context;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use sitesearch_mcp::cli::{Cli, Commands, resolve_store};
use sitesearch_mcp::error::LoadError;
use sitesearch_mcp::search::SearchIndex;
use sitesearch_mcp::store::load_store;
use sitesearch_mcp::tools::{format_index_summary, format_search_results};
use sitesearch_mcp::worker::spawn_store_watcher;
use sitesearch_mcp::{SearchServer, SearchState};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    sitesearch_mcp::tracing::init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    match cli.command {
        Commands::Serve {
            store,
            watch_interval,
        } => {
            serve(store.as_deref(), &cwd, Duration::from_secs(watch_interval)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Search {
            query,
            store,
            limit,
            json,
        } => {
            let path = resolve_store(store.as_deref(), &cwd)?;
            let index = build_index(&path).await?;
            let hits = index.search(&query, Some(limit));

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No results found for '{}'.", query);
            } else {
                print!("{}", format_search_results(&hits, &query));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { store } => {
            let path = resolve_store(store.as_deref(), &cwd)?;
            match build_index(&path).await {
                Ok(index) => {
                    print!(
                        "{}",
                        format_index_summary("Store is valid", Some(&path), &index)
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}: {:#}", path.display(), e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

async fn serve(store: Option<&str>, cwd: &Path, watch_interval: Duration) -> anyhow::Result<()> {
    tracing::info!("Starting sitesearch-mcp MCP server");

    let state = match resolve_store(store, cwd) {
        Ok(path) => initial_state(path).await,
        Err(LoadError::NoStore) => {
            tracing::warn!(
                "No search store found under {}, waiting for a reload request",
                cwd.display()
            );
            Arc::new(SearchState::new())
        }
        Err(e) => return Err(e.into()),
    };

    let _watcher = spawn_store_watcher(state.clone(), watch_interval);

    // Create and serve the MCP server over stdio
    let server = SearchServer::new(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;

    Ok(())
}

/// Load the store at startup. A broken store leaves the server running without an index.
async fn initial_state(path: PathBuf) -> Arc<SearchState> {
    let state = Arc::new(SearchState::with_store(path));
    if let Err(e) = state.reload(None).await {
        tracing::warn!("Initial index build failed: {}", e);
    }
    state
}

async fn build_index(path: &Path) -> anyhow::Result<SearchIndex> {
    let documents = load_store(path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let index = SearchIndex::build(documents)
        .with_context(|| format!("Failed to index {}", path.display()))?;
    Ok(index)
}
