//! Queue ordering, listing degradation, and expiry behavior.

use std::sync::Arc;
use std::time::Duration;

use barbearia_server::queue::QueueManager;
use barbearia_server::store::{ClientRow, QueueStore};
use chrono::Utc;
use tempfile::tempdir;

const BARBERS: &[&str] = &["junior", "yago", "reine"];

async fn setup(ttl: Duration) -> (tempfile::TempDir, Arc<QueueStore>, QueueManager) {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}/queue.sqlite", dir.path().display());
    let store = Arc::new(QueueStore::connect(&url).await.unwrap());

    let barbers = BARBERS.iter().map(|b| b.to_string()).collect();
    let manager = QueueManager::new(store.clone(), barbers, ttl);

    (dir, store, manager)
}

#[tokio::test]
async fn positions_follow_arrival_order() {
    let (_dir, _store, queues) = setup(Duration::from_secs(780)).await;

    let a = queues.join("Ana", "junior").await.unwrap();
    let b = queues.join("Bruno", "junior").await.unwrap();
    let c = queues.join("Carla", "junior").await.unwrap();

    assert_eq!(a.position, 1);
    assert_eq!(b.position, 2);
    assert_eq!(c.position, 3);

    // Another barber's queue is independent.
    let d = queues.join("Duda", "yago").await.unwrap();
    assert_eq!(d.position, 1);
}

#[tokio::test]
async fn barber_is_lowercased_on_join() {
    let (_dir, _store, queues) = setup(Duration::from_secs(780)).await;

    let receipt = queues.join("Ana", "Junior").await.unwrap();
    assert_eq!(receipt.position, 1);

    let listing = queues.list_queues().await;
    let junior = &listing["junior"];
    assert_eq!(junior.len(), 1);
    assert_eq!(junior[0].name, "Ana");
    assert_eq!(junior[0].client_id, receipt.client_id);
}

#[tokio::test]
async fn leave_shifts_subsequent_positions() {
    let (_dir, _store, queues) = setup(Duration::from_secs(780)).await;

    let a = queues.join("Ana", "junior").await.unwrap();
    let b = queues.join("Bruno", "junior").await.unwrap();

    queues.remove(&a.client_id).await.unwrap();

    // Bruno is now first; the next join lands second.
    let c = queues.join("Carla", "junior").await.unwrap();
    assert_eq!(c.position, 2);

    let listing = queues.list_queues().await;
    let junior = &listing["junior"];
    assert_eq!(junior[0].client_id, b.client_id);
    assert_eq!(junior[1].client_id, c.client_id);
}

#[tokio::test]
async fn removing_unknown_client_is_success() {
    let (_dir, _store, queues) = setup(Duration::from_secs(780)).await;

    queues.remove("no-such-id").await.unwrap();
}

#[tokio::test]
async fn listing_always_contains_every_barber() {
    let (_dir, _store, queues) = setup(Duration::from_secs(780)).await;

    let listing = queues.list_queues().await;

    assert_eq!(listing.len(), BARBERS.len());
    for barber in BARBERS {
        assert!(listing[*barber].is_empty());
    }
}

#[tokio::test]
async fn manual_walkin_appears_in_listing() {
    let (_dir, _store, queues) = setup(Duration::from_secs(780)).await;

    let id = queues.add_manual("Walk In", "Reine").await.unwrap();

    let listing = queues.list_queues().await;
    let reine = &listing["reine"];
    assert_eq!(reine.len(), 1);
    assert_eq!(reine[0].client_id, id);

    // Walk-ins count for positions of later joins.
    let next = queues.join("Ana", "reine").await.unwrap();
    assert_eq!(next.position, 2);
}

#[tokio::test]
async fn listing_degrades_failing_barbers_to_empty_lists() {
    let dir = tempdir().unwrap();
    let path = format!("{}/queue.sqlite", dir.path().display());
    let url = format!("sqlite://{path}");
    let store = Arc::new(QueueStore::connect(&url).await.unwrap());

    let barbers = BARBERS.iter().map(|b| b.to_string()).collect();
    let queues = QueueManager::new(store, barbers, Duration::from_secs(780));

    queues.join("Ana", "junior").await.unwrap();

    // Break the store out from under the manager.
    let pool = sqlx::SqlitePool::connect(&url).await.unwrap();
    sqlx::query("DROP TABLE clients").execute(&pool).await.unwrap();

    // Every configured key is still present, each degraded to empty.
    let listing = queues.list_queues().await;
    assert_eq!(listing.len(), BARBERS.len());
    for barber in BARBERS {
        assert!(listing[*barber].is_empty());
    }
}

#[tokio::test]
async fn expiry_removes_client_after_ttl() {
    let (_dir, store, queues) = setup(Duration::from_millis(100)).await;

    let receipt = queues.join("Ana", "junior").await.unwrap();
    assert_eq!(queues.expiry().pending(), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let ids = store.waiting_ids("junior").await.unwrap();
    assert!(!ids.contains(&receipt.client_id));
    assert_eq!(queues.expiry().pending(), 0);
}

#[tokio::test]
async fn leave_cancels_pending_expiry() {
    let (_dir, store, queues) = setup(Duration::from_millis(200)).await;

    let receipt = queues.join("Ana", "junior").await.unwrap();
    queues.remove(&receipt.client_id).await.unwrap();
    assert_eq!(queues.expiry().pending(), 0);

    // Re-create a row under the same id directly; the aborted timer must
    // not delete it after the TTL would have elapsed.
    store
        .insert_client(&ClientRow {
            id: receipt.client_id.clone(),
            name: "Ana".to_string(),
            barber: "junior".to_string(),
            status: "waiting".to_string(),
            timestamp: Utc::now(),
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;

    let ids = store.waiting_ids("junior").await.unwrap();
    assert!(ids.contains(&receipt.client_id));
}
