use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use super::notify::run_watcher;
use super::NotifyWatcher;
use crate::errors::Result;
use crate::state::AttributeKey;
use crate::state::StateStore;

/// Creates, multiplexes and tears down attribute watchers.
///
/// Watcher ids are unique for the manager's lifetime and double as the
/// out-of-band notification key on the wire. The registry only holds each
/// watcher's cancellation token; the event path belongs to the watcher task
/// alone.
pub struct WatcherManager {
    state: Arc<dyn StateStore>,
    next_id: AtomicU64,
    watchers: Arc<DashMap<u64, CancellationToken>>,
    shutdown: CancellationToken,
}

impl WatcherManager {
    pub fn new(state: Arc<dyn StateStore>) -> Self {
        Self {
            state,
            next_id: AtomicU64::new(1),
            watchers: Arc::new(DashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Allocates an `Active` watcher on one attribute.
    ///
    /// Fails with `EntityNotFound` when the owning entity does not resolve.
    /// The returned watcher has exactly one initial notification queued.
    pub fn watch(&self, key: AttributeKey) -> Result<NotifyWatcher> {
        // Subscribe before the baseline read so no raw event can fall into
        // the gap between them.
        let feed = self.state.subscribe();
        self.state.attribute(&key)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = self.shutdown.child_token();
        self.watchers.insert(id, cancel.clone());

        let (tx, rx) = mpsc::channel(1);
        let state = self.state.clone();
        let task_cancel = cancel.clone();
        let task_key = key.clone();
        let registry = self.watchers.clone();
        tokio::spawn(async move {
            run_watcher(id, task_key, state, feed, tx, task_cancel).await;
            registry.remove(&id);
        });

        debug!("watch: id={} attribute={}/{}", id, key.tag, key.name);
        Ok(NotifyWatcher::new(id, rx, cancel))
    }

    /// Stops one watcher by id. Idempotent: stopping an already-stopped or
    /// unknown watcher is a no-op, so concurrent stops never double-release.
    pub fn stop(&self, id: u64) {
        if let Some(entry) = self.watchers.get(&id) {
            entry.value().cancel();
        }
    }

    /// Stops every live watcher. Used when the server begins draining.
    pub fn stop_all(&self) {
        info!("stopping {} live watchers", self.watchers.len());
        self.shutdown.cancel();
        self.watchers.clear();
    }

    #[cfg(test)]
    pub(crate) fn live_watchers(&self) -> usize {
        self.watchers.len()
    }
}
