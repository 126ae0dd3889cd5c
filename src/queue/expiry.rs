//! Expiry scheduler
//!
//! Every joined client gets one deferred deletion after a fixed TTL, so
//! no-shows do not clog the queue. Timers are tracked per client id and
//! aborted when the client leaves or is served; if a timer still fires after
//! the row is gone, delete-by-id is an idempotent no-op.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::QueueStore;

pub struct ExpiryScheduler {
    store: Arc<QueueStore>,
    ttl: Duration,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl ExpiryScheduler {
    pub fn new(store: Arc<QueueStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule the deferred removal of a client. A second schedule for the
    /// same id replaces the first timer.
    pub fn schedule(self: &Arc<Self>, client_id: String) {
        let scheduler = Arc::clone(self);
        let id = client_id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(scheduler.ttl).await;

            match scheduler.store.delete_client(&id).await {
                Ok(()) => info!("[Expiry] Client {} removed automatically", id),
                Err(e) => warn!("[Expiry] Failed to remove client {}: {}", id, e),
            }

            scheduler.timers.lock().remove(&id);
        });

        if let Some(previous) = self.timers.lock().insert(client_id, handle) {
            previous.abort();
        }
    }

    /// Abort the pending timer for a client, if any.
    pub fn cancel(&self, client_id: &str) {
        if let Some(handle) = self.timers.lock().remove(client_id) {
            handle.abort();
            debug!("[Expiry] Timer cancelled for {}", client_id);
        }
    }

    /// Number of timers currently outstanding.
    pub fn pending(&self) -> usize {
        self.timers.lock().len()
    }
}
