//! Background worker that reloads the search store when the generator rewrites it.
//!
//! The worker polls the store's modification time on a fixed interval and
//! rebuilds the index when it changes. Failed reloads are logged and the
//! previous index stays active.

use crate::state::SearchState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Default interval between store modification checks.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Background worker that keeps the active index in sync with the store file.
pub struct StoreWatcher {
    state: Arc<SearchState>,
    period: Duration,
    /// Store the modification time below belongs to
    watched: Option<PathBuf>,
    /// Last modification time a reload was attempted for, successful or not
    last_seen: Option<SystemTime>,
}

impl StoreWatcher {
    /// Create a new watcher polling every `period`.
    pub fn new(state: Arc<SearchState>, period: Duration) -> Self {
        Self {
            state,
            period,
            watched: None,
            last_seen: None,
        }
    }

    /// Run the watcher loop indefinitely.
    pub async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    /// Perform one check, reloading if the store changed.
    ///
    /// Returns `true` when a reload was attempted.
    pub(crate) async fn poll_once(&mut self) -> bool {
        let Some(path) = self.state.store_path().await else {
            tracing::trace!("No store configured");
            return false;
        };

        let mtime = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(e) => {
                tracing::trace!("Cannot stat store {}: {}", path.display(), e);
                return false;
            }
        };

        // Start over from the loaded mtime whenever the store was switched
        if self.watched.as_ref() != Some(&path) {
            self.watched = Some(path.clone());
            self.last_seen = None;
        }
        if self.last_seen.is_none() {
            self.last_seen = self.state.loaded_mtime().await;
        }
        if self.last_seen == Some(mtime) {
            return false;
        }
        self.last_seen = Some(mtime);

        tracing::debug!("Store {} changed, reloading", path.display());
        match self.state.reload_if_current(&path).await {
            Ok(None) => {
                tracing::debug!("Store switched away from {}, skipping reload", path.display());
                self.watched = None;
                return false;
            }
            Ok(Some(index)) => {
                tracing::info!(
                    "Background worker reloaded {} ({} documents)",
                    path.display(),
                    index.len()
                );
            }
            Err(e) => {
                tracing::warn!("Background reload of {} failed: {}", path.display(), e);
            }
        }
        true
    }
}

/// Spawn the store watcher as a tokio task.
///
/// Returns `None` when `period` is zero, which disables watching.
pub fn spawn_store_watcher(
    state: Arc<SearchState>,
    period: Duration,
) -> Option<tokio::task::JoinHandle<()>> {
    if period.is_zero() {
        tracing::debug!("Store watching disabled");
        return None;
    }
    Some(tokio::spawn(StoreWatcher::new(state, period).run()))
}
