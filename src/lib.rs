pub mod cli;
pub mod document;
pub mod error;
pub mod search;
pub mod server;
pub mod state;
pub mod store;
pub mod tools;
pub mod tracing;
pub mod worker;

pub use document::Document;
pub use error::{BuildError, LoadError, Result};
pub use search::{IndexStats, SearchHit, SearchIndex, TitleCollision};
pub use server::SearchServer;
pub use state::SearchState;
pub use worker::{StoreWatcher, spawn_store_watcher};
