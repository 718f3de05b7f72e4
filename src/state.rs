//! Shared search state: the active index and the store it was loaded from.

use crate::document::Document;
use crate::error::{BuildError, LoadError};
use crate::search::{SearchHit, SearchIndex};
use crate::store::load_store;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, RwLock};

/// Central coordination point for serving queries.
///
/// The active index sits behind an `Arc` that is swapped wholesale: queries
/// clone the `Arc` and run without holding the lock, so an in-flight query sees
/// either the old or the new index, never a partial one. A failed rebuild
/// leaves the previous index active.
#[derive(Default)]
pub struct SearchState {
    /// Active index, `None` until the first successful build
    index: RwLock<Option<Arc<SearchIndex>>>,

    /// Store file the active index was loaded from
    store_path: RwLock<Option<PathBuf>>,

    /// Modification time of the store when it was last loaded
    loaded_mtime: RwLock<Option<SystemTime>>,

    /// Serializes reloads so concurrent requests don't race on the store file
    reload_lock: Mutex<()>,
}

impl std::fmt::Debug for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchState")
            .field(
                "documents",
                &self
                    .index
                    .try_read()
                    .ok()
                    .and_then(|index| index.as_ref().map(|i| i.len())),
            )
            .field("store_path", &self.store_path.try_read().ok().and_then(|p| p.clone()))
            .finish_non_exhaustive()
    }
}

impl SearchState {
    /// Create an empty state with no index and no store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state that will load from `path` on [`SearchState::reload`].
    pub fn with_store(path: PathBuf) -> Self {
        Self {
            store_path: RwLock::new(Some(path)),
            ..Self::default()
        }
    }

    /// Snapshot of the active index.
    pub async fn current(&self) -> Option<Arc<SearchIndex>> {
        self.index.read().await.clone()
    }

    pub async fn is_built(&self) -> bool {
        self.index.read().await.is_some()
    }

    pub async fn store_path(&self) -> Option<PathBuf> {
        self.store_path.read().await.clone()
    }

    pub async fn loaded_mtime(&self) -> Option<SystemTime> {
        *self.loaded_mtime.read().await
    }

    /// Make `index` the active index, returning it.
    pub async fn install(&self, index: SearchIndex) -> Arc<SearchIndex> {
        let index = Arc::new(index);
        let previous = self.index.write().await.replace(index.clone());

        if let Some(previous) = previous {
            tracing::debug!(
                "Replaced search index ({} → {} documents)",
                previous.len(),
                index.len()
            );
        }
        index
    }

    /// Build an index over `documents` and swap it in.
    ///
    /// The build runs off the async executor; the lock is only held for the swap.
    pub async fn rebuild(&self, documents: Vec<Document>) -> Result<Arc<SearchIndex>, BuildError> {
        let index = tokio::task::spawn_blocking(move || SearchIndex::build(documents))
            .await
            .expect("Index build task panicked")
            .inspect_err(|e| tracing::warn!("Rebuild rejected, keeping current index: {}", e))?;

        Ok(self.install(index).await)
    }

    /// Reload the store from `path`, or from the configured store when `None`.
    ///
    /// On success the path and its modification time become the state's store.
    pub async fn reload(&self, path: Option<&Path>) -> Result<Arc<SearchIndex>, LoadError> {
        let _guard = self.reload_lock.lock().await;

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => self.store_path().await.ok_or(LoadError::NoStore)?,
        };

        self.load_and_install(path).await
    }

    /// Reload from `path` only if it is still the configured store.
    ///
    /// Returns `Ok(None)` without touching anything when another reload has
    /// switched the store in the meantime.
    pub async fn reload_if_current(
        &self,
        path: &Path,
    ) -> Result<Option<Arc<SearchIndex>>, LoadError> {
        let _guard = self.reload_lock.lock().await;

        if self.store_path().await.as_deref() != Some(path) {
            return Ok(None);
        }
        self.load_and_install(path.to_path_buf()).await.map(Some)
    }

    /// Load `path`, swap in its index, and record it as the store.
    ///
    /// Callers hold `reload_lock`.
    async fn load_and_install(&self, path: PathBuf) -> Result<Arc<SearchIndex>, LoadError> {
        // Read the mtime first so a write racing with the load triggers another reload
        let mtime = tokio::fs::metadata(&path)
            .await
            .ok()
            .and_then(|m| m.modified().ok());

        let documents = load_store(&path).await?;
        let index = self.rebuild(documents).await?;

        tracing::info!(
            "Loaded search store {} ({} documents)",
            path.display(),
            index.len()
        );

        *self.store_path.write().await = Some(path);
        *self.loaded_mtime.write().await = mtime;

        Ok(index)
    }

    /// Query the active index, or `None` when nothing has been built yet.
    pub async fn search(&self, text: &str, limit: Option<usize>) -> Option<Vec<SearchHit>> {
        let index = self.current().await?;
        Some(index.search(text, limit))
    }
}
