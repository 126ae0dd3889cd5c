//! Queue ordering logic
//!
//! A client's position is never stored: it is the 1-based rank of their id
//! in the waiting list for their barber, ordered by join time ascending, and
//! is recomputed on demand. The relational store's transactional guarantees
//! are the only coordination used.

pub mod expiry;
pub mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{ClientRow, QueueStore};
pub use expiry::ExpiryScheduler;

const STATUS_WAITING: &str = "waiting";

/// Outcome of a successful join.
#[derive(Debug, Clone)]
pub struct JoinReceipt {
    pub client_id: String,
    pub position: usize,
}

/// One waiting client as shown in queue listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub client_id: String,
    pub name: String,
}

pub struct QueueManager {
    store: Arc<QueueStore>,
    barbers: Vec<String>,
    expiry: Arc<ExpiryScheduler>,
}

impl QueueManager {
    pub fn new(store: Arc<QueueStore>, barbers: Vec<String>, queue_ttl: Duration) -> Self {
        let expiry = Arc::new(ExpiryScheduler::new(store.clone(), queue_ttl));
        Self {
            store,
            barbers,
            expiry,
        }
    }

    /// Insert a client into a barber's queue and compute their position:
    /// the index of the new id in the full ascending-ordered waiting list,
    /// plus one. Schedules the automatic expiry of the entry.
    pub async fn join(&self, name: &str, barber: &str) -> Result<JoinReceipt> {
        let barber = barber.to_lowercase();
        let row = ClientRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            barber: barber.clone(),
            status: STATUS_WAITING.to_string(),
            timestamp: Utc::now(),
        };

        self.store
            .insert_client(&row)
            .await
            .map_err(|e| Error::store("Failed to add client to the queue.", e))?;

        let ids = self
            .store
            .waiting_ids(&barber)
            .await
            .map_err(|e| Error::store("Failed to read the queue.", e))?;

        let position = ids
            .iter()
            .position(|id| id == &row.id)
            .map(|i| i + 1)
            .ok_or_else(|| {
                Error::Internal("Inserted client missing from queue listing.".to_string())
            })?;

        self.expiry.schedule(row.id.clone());

        info!(
            "[Queue] Client {} joined queue '{}' at position {}",
            row.id, barber, position
        );

        Ok(JoinReceipt {
            client_id: row.id,
            position,
        })
    }

    /// Delete a client by id, cancelling their expiry timer. Removing an id
    /// that is not queued is a success.
    pub async fn remove(&self, client_id: &str) -> Result<()> {
        self.expiry.cancel(client_id);

        self.store
            .delete_client(client_id)
            .await
            .map_err(|e| Error::store("Failed to remove client from the queue.", e))?;

        info!("[Queue] Client {} removed", client_id);
        Ok(())
    }

    /// Staff walk-in: insert directly, no position, no expiry timer.
    pub async fn add_manual(&self, name: &str, barber: &str) -> Result<String> {
        let row = ClientRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            barber: barber.to_lowercase(),
            status: STATUS_WAITING.to_string(),
            timestamp: Utc::now(),
        };

        self.store
            .insert_client(&row)
            .await
            .map_err(|e| Error::store("Failed to add client to the queue.", e))?;

        info!("[Queue] Client {} added manually to '{}'", row.id, row.barber);
        Ok(row.id)
    }

    /// Waiting lists for every configured barber, fetched concurrently.
    /// A failing barber degrades to an empty list; one barber's store error
    /// never hides the others' queues. Every configured barber key is always
    /// present in the result.
    pub async fn list_queues(&self) -> BTreeMap<String, Vec<QueueEntry>> {
        let fetches = self.barbers.iter().map(|barber| {
            let store = self.store.clone();
            let barber = barber.clone();
            async move {
                let result = store.waiting_clients(&barber).await;
                (barber, result)
            }
        });

        join_all(fetches)
            .await
            .into_iter()
            .map(|(barber, result)| match result {
                Ok(rows) => {
                    let entries = rows
                        .into_iter()
                        .map(|(client_id, name)| QueueEntry { client_id, name })
                        .collect();
                    (barber, entries)
                }
                Err(e) => {
                    warn!("[Queue] Failed to fetch queue for '{}': {}", barber, e);
                    (barber, Vec::new())
                }
            })
            .collect()
    }

    pub fn expiry(&self) -> &Arc<ExpiryScheduler> {
        &self.expiry
    }
}
