//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for sitesearch-mcp glue code.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` in the binary and tool handlers.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when building a search index fails.
///
/// A failed build never replaces an index that is already active.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Two records share the same url.
    #[error("duplicate url '{url}' in records {first} and {second}")]
    DuplicateUrl {
        url: String,
        first: usize,
        second: usize,
    },
    /// A record is missing a required field or has the wrong shape.
    #[error("record {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

/// Error returned when loading a search store from disk fails.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The store file could not be read.
    #[error("failed to read store at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The store text does not contain a JSON array of records.
    #[error("store is not a valid record array: {0}")]
    Syntax(String),
    /// The records were read but do not form a valid collection.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// A reload was requested but no store path is configured.
    #[error("no search store configured")]
    NoStore,
}
