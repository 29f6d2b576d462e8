//! Driver integration tests
//!
//! Exercises the async edge: the change subscription and reconciliation
//! poll running on a spawned task, syncing one context with writes made by
//! another. Intervals are shrunk so the test settles quickly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use recap_core::{PersistentStore, PlaylistKind, VideoItem};
use recap_storage::{Playlists, SharedNamespace};
use recap_tracking::{SessionDriver, StudySession, TrackingConfig};

fn fast_config() -> TrackingConfig {
    TrackingConfig {
        tick_interval: Duration::from_millis(10),
        reconcile_interval: Duration::from_millis(20),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn driver_syncs_external_completion() {
    let namespace = SharedNamespace::new();
    let store_a: Arc<dyn PersistentStore> = Arc::new(namespace.open_context());
    let store_b: Arc<dyn PersistentStore> = Arc::new(namespace.open_context());

    // Seed a two-item playlist from context A
    let playlists = Playlists::new(Arc::clone(&store_a));
    let playlist = playlists.create("Shared", PlaylistKind::Course).unwrap();
    let item_a = VideoItem::new("a", "A");
    let a_id = item_a.id.clone();
    playlists.add_item(&playlist.id, item_a).unwrap();
    playlists
        .add_item(&playlist.id, VideoItem::new("b", "B"))
        .unwrap();

    // Context B runs a full driven session
    let session_b = Arc::new(Mutex::new(
        StudySession::new(Arc::clone(&store_b), playlist.id.clone(), fast_config()).unwrap(),
    ));
    let driver = SessionDriver::spawn(Arc::clone(&session_b));

    // Context A completes item A while B is watching the store
    let mut session_a =
        StudySession::new(Arc::clone(&store_a), playlist.id.clone(), fast_config()).unwrap();
    session_a.mark_complete().unwrap();

    // Within a few poll intervals B has converged
    tokio::time::sleep(Duration::from_millis(200)).await;
    driver.abort();

    let mut session_b = session_b.lock().unwrap();
    let playlist_b = session_b.playlist().unwrap();
    assert_eq!(playlist_b.item(&a_id).unwrap().progress, 100);
    assert_ne!(session_b.current_item(), Some(&a_id));

    // Converged means reconciliation is a no-op now
    assert!(!session_b.reconcile_now().unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn driver_stops_when_the_playlist_is_deleted() {
    let namespace = SharedNamespace::new();
    let store_a: Arc<dyn PersistentStore> = Arc::new(namespace.open_context());
    let store_b: Arc<dyn PersistentStore> = Arc::new(namespace.open_context());

    let playlists = Playlists::new(Arc::clone(&store_a));
    let playlist = playlists.create("Doomed", PlaylistKind::Custom).unwrap();
    playlists
        .add_item(&playlist.id, VideoItem::new("a", "A"))
        .unwrap();

    let session = Arc::new(Mutex::new(
        StudySession::new(Arc::clone(&store_b), playlist.id.clone(), fast_config()).unwrap(),
    ));
    let driver = SessionDriver::spawn(Arc::clone(&session));

    // Another context deletes the playlist; the driver must settle instead
    // of retrying forever
    playlists.delete(&playlist.id).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(driver.is_finished());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn driver_poll_covers_stores_without_push() {
    // Writes from the session's own context are never broadcast back to
    // it, so the poll alone must reconcile drift written behind its back.
    let namespace = SharedNamespace::new();
    let store: Arc<dyn PersistentStore> = Arc::new(namespace.open_context());
    let same_context = Arc::clone(&store);

    let playlists = Playlists::new(Arc::clone(&store));
    let playlist = playlists.create("Solo", PlaylistKind::Custom).unwrap();
    let item = VideoItem::new("a", "A");
    let item_id = item.id.clone();
    playlists.add_item(&playlist.id, item).unwrap();

    let session = Arc::new(Mutex::new(
        StudySession::new(Arc::clone(&store), playlist.id.clone(), fast_config()).unwrap(),
    ));
    let driver = SessionDriver::spawn(Arc::clone(&session));

    // Another handle completes the item via the ledger + a second session
    let mut other =
        StudySession::new(same_context, playlist.id.clone(), fast_config()).unwrap();
    other.mark_complete_item(&item_id).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    driver.abort();

    let session = session.lock().unwrap();
    assert_eq!(
        session.playlist().unwrap().item(&item_id).unwrap().progress,
        100
    );
}
