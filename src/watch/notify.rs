use std::sync::Arc;

use tokio::select;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::state::AttributeEvent;
use crate::state::AttributeKey;
use crate::state::StateStore;

/// A live subscription delivering change markers for one watched attribute.
///
/// State machine: `Created → Active → Stopped`, no way back. The stream
/// yields exactly one initial marker before any external mutation is
/// observed, then one marker per externally visible value change.
/// Notifications carry no payload; the consumer re-reads the value.
#[derive(Debug)]
pub struct NotifyWatcher {
    id: u64,
    changes: mpsc::Receiver<()>,
    cancel: CancellationToken,
}

impl NotifyWatcher {
    pub(super) fn new(id: u64, changes: mpsc::Receiver<()>, cancel: CancellationToken) -> Self {
        Self { id, changes, cancel }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Awaits the next change marker. Returns `None` once the watcher is
    /// stopped and every already-buffered marker has been drained.
    pub async fn next(&mut self) -> Option<()> {
        self.changes.recv().await
    }

    /// Transitions the watcher to `Stopped` and releases its subscription.
    ///
    /// Idempotent: repeated or concurrent calls never error and never
    /// double-release; already-buffered markers stay readable.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for NotifyWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Per-watcher background loop: consumes the raw feed, keeps the cursor of
/// the last delivered value and feeds the single-slot mailbox.
pub(super) async fn run_watcher(
    id: u64,
    key: AttributeKey,
    state: Arc<dyn StateStore>,
    mut feed: broadcast::Receiver<AttributeEvent>,
    tx: mpsc::Sender<()>,
    cancel: CancellationToken,
) {
    // Initial notification: "current value known, no prior baseline".
    // The mailbox is empty at this point, so the send cannot fail.
    let _ = tx.try_send(());
    let mut last = match state.attribute(&key) {
        Ok(v) => v,
        Err(e) => {
            warn!("watcher {} for {}/{}: baseline read failed: {}", id, key.tag, key.name, e);
            return;
        }
    };

    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!("watcher {} for {}/{}: stopped", id, key.tag, key.name);
                break;
            }
            event = feed.recv() => {
                match event {
                    Ok(ev) => {
                        if ev.key != key {
                            continue;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Fell behind the raw feed; the live-value compare
                        // below resynchronizes the cursor.
                        warn!("watcher {} lagged {} raw events", id, missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("watcher {}: change feed closed", id);
                        break;
                    }
                }
                let current = match state.attribute(&key) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("watcher {}: read failed, stopping: {}", id, e);
                        break;
                    }
                };
                if current != last {
                    last = current;
                    // Full mailbox means a marker is already pending for the
                    // subscriber; the latest value wins.
                    let _ = tx.try_send(());
                }
            }
        }
    }
    // Dropping tx closes the stream once buffered markers are drained.
}
