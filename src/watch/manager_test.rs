use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::auth::Role;
use crate::state::AttributeKey;
use crate::state::EntityRecord;
use crate::state::MemoryState;
use crate::tag::Tag;
use crate::watch::WatcherManager;

fn seeded_manager() -> (Arc<MemoryState>, WatcherManager) {
    let state = Arc::new(MemoryState::new());
    state.add_entity(EntityRecord {
        tag: Tag::machine("0"),
        secret: "password".to_string(),
        nonce: None,
        roles: vec![Role::HostUnits],
    });
    let manager = WatcherManager::new(state.clone());
    (state, manager)
}

fn keys_attr() -> AttributeKey {
    AttributeKey::new(Tag::machine("0"), "authorized-keys")
}

#[tokio::test]
async fn test_ids_are_unique_and_monotonic() {
    let (_state, manager) = seeded_manager();
    let a = manager.watch(keys_attr()).expect("should watch");
    let b = manager.watch(keys_attr()).expect("should watch");
    assert!(b.id() > a.id());
}

#[tokio::test]
async fn test_stop_by_id_closes_the_watcher() {
    let (_state, manager) = seeded_manager();
    let mut w = manager.watch(keys_attr()).expect("should watch");
    let id = w.id();

    // Drain the initial marker first so the close is observable.
    timeout(Duration::from_secs(5), w.next())
        .await
        .expect("should not hang")
        .expect("initial marker");

    manager.stop(id);
    manager.stop(id); // idempotent
    manager.stop(9999); // unknown id is a no-op

    let closed = timeout(Duration::from_secs(5), w.next()).await.expect("should not hang");
    assert_eq!(closed, None);
}

#[tokio::test]
async fn test_finished_watchers_leave_the_registry() {
    let (_state, manager) = seeded_manager();
    let w = manager.watch(keys_attr()).expect("should watch");
    assert_eq!(manager.live_watchers(), 1);

    w.stop();
    // The task removes itself on exit.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while manager.live_watchers() != 0 {
        assert!(tokio::time::Instant::now() < deadline, "registry never drained");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_stop_all_closes_every_watcher() {
    let (_state, manager) = seeded_manager();
    let mut a = manager.watch(keys_attr()).expect("should watch");
    let mut b = manager.watch(keys_attr()).expect("should watch");

    manager.stop_all();

    for w in [&mut a, &mut b] {
        // Initial marker may still drain, then the stream must close.
        loop {
            match timeout(Duration::from_secs(5), w.next()).await.expect("should not hang") {
                Some(()) => continue,
                None => break,
            }
        }
    }
    assert_eq!(manager.live_watchers(), 0);
}
