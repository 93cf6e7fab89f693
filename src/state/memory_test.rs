use crate::auth::Role;
use crate::state::AttributeKey;
use crate::state::EntityRecord;
use crate::state::MemoryState;
use crate::state::StateStore;
use crate::tag::Tag;

fn machine_record(id: &str) -> EntityRecord {
    EntityRecord {
        tag: Tag::machine(id),
        secret: "password".to_string(),
        nonce: None,
        roles: vec![Role::HostUnits],
    }
}

#[test]
fn test_entity_lookup() {
    let state = MemoryState::new();
    state.add_entity(machine_record("0"));

    assert!(state.entity(&Tag::machine("0")).is_some());
    assert!(state.entity(&Tag::machine("42")).is_none());
}

#[test]
fn test_attribute_defaults_to_empty_for_known_entity() {
    let state = MemoryState::new();
    state.add_entity(machine_record("0"));

    let key = AttributeKey::new(Tag::machine("0"), "authorized-keys");
    assert_eq!(state.attribute(&key).expect("should read"), "");
}

#[test]
fn test_attribute_unknown_entity_is_not_found() {
    let state = MemoryState::new();
    let key = AttributeKey::new(Tag::machine("42"), "authorized-keys");
    let err = state.attribute(&key).expect_err("should fail");
    assert_eq!(err.to_string(), "machine 42 not found");
}

#[tokio::test]
async fn test_every_write_reaches_the_feed_with_advancing_revision() {
    let state = MemoryState::new();
    state.add_entity(machine_record("0"));
    let mut feed = state.subscribe();

    let key = AttributeKey::new(Tag::machine("0"), "authorized-keys");
    state.set_attribute(key.clone(), "k1");
    state.set_attribute(key.clone(), "k1"); // identical value still lands

    let first = feed.recv().await.expect("first event");
    let second = feed.recv().await.expect("second event");
    assert_eq!(first.key, key);
    assert_eq!(second.key, key);
    assert!(second.revision > first.revision);
    assert_eq!(state.attribute(&key).expect("should read"), "k1");
}
