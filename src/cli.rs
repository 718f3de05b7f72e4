use crate::error::LoadError;
use crate::store::{discover_store, expand_tilde};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "sitesearch-mcp")]
#[command(about = "Full-text search over a generated static site", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the search index over MCP on stdio
    Serve {
        /// Store file (lunr-store.js or JSON array); discovered from the current directory if omitted
        #[arg(short, long)]
        store: Option<String>,
        /// Seconds between store change checks, 0 to disable
        #[arg(long, default_value = "5")]
        watch_interval: u64,
    },
    /// Run a single query and print the results
    Search {
        query: String,
        #[arg(short, long)]
        store: Option<String>,
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
        /// Print hits as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a store: fails on duplicate URLs or malformed records
    Check {
        #[arg(short, long)]
        store: Option<String>,
    },
}

/// Resolve the store path from an explicit argument or by looking under `site_root`.
pub fn resolve_store(store: Option<&str>, site_root: &Path) -> Result<PathBuf, LoadError> {
    match store {
        Some(path) => Ok(PathBuf::from(&*expand_tilde(path))),
        None => discover_store(site_root).ok_or(LoadError::NoStore),
    }
}
