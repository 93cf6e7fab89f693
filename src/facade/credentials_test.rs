use std::sync::Arc;

use crate::auth::Role;
use crate::facade::credentials::authorised_keys;
use crate::facade::credentials::AUTHORIZED_KEYS_ATTR;
use crate::state::AttributeKey;
use crate::state::EntityRecord;
use crate::state::MemoryState;
use crate::state::StateStore;
use crate::tag::Tag;

fn seeded() -> Arc<dyn StateStore> {
    let state = MemoryState::new();
    state.add_entity(EntityRecord {
        tag: Tag::machine("0"),
        secret: "password".to_string(),
        nonce: None,
        roles: vec![Role::HostUnits],
    });
    state.set_attribute(
        AttributeKey::new(Tag::machine("0"), AUTHORIZED_KEYS_ATTR),
        "key1\nkey2\nkey3",
    );
    Arc::new(state)
}

#[test]
fn test_authorised_keys_splits_in_order() {
    let state = seeded();
    let keys = authorised_keys(&state, "machine-0").expect("should read");
    assert_eq!(keys, vec!["key1", "key2", "key3"]);
}

#[test]
fn test_authorised_keys_preserves_entry_whitespace() {
    // No trimming beyond the split boundary.
    let raw = MemoryState::new();
    raw.add_entity(EntityRecord {
        tag: Tag::machine("0"),
        secret: "password".to_string(),
        nonce: None,
        roles: vec![],
    });
    raw.set_attribute(
        AttributeKey::new(Tag::machine("0"), AUTHORIZED_KEYS_ATTR),
        " key1 \nkey2",
    );
    let raw: Arc<dyn StateStore> = Arc::new(raw);
    assert_eq!(authorised_keys(&raw, "machine-0").expect("should read"), vec![" key1 ", "key2"]);
}

#[test]
fn test_authorised_keys_empty_attribute_is_empty_sequence() {
    let state = MemoryState::new();
    state.add_entity(EntityRecord {
        tag: Tag::machine("1"),
        secret: "password".to_string(),
        nonce: None,
        roles: vec![],
    });
    let state: Arc<dyn StateStore> = Arc::new(state);
    assert!(authorised_keys(&state, "machine-1").expect("should read").is_empty());
}

#[test]
fn test_authorised_keys_unknown_machine() {
    let state = seeded();
    let err = authorised_keys(&state, "machine-42").expect_err("should fail");
    assert_eq!(err.to_string(), "machine 42 not found");
}

#[test]
fn test_authorised_keys_rejects_non_machine_tags() {
    let state = seeded();
    let err = authorised_keys(&state, "user-admin").expect_err("should fail");
    assert!(matches!(err, crate::Error::NotValid(_)));

    let err = authorised_keys(&state, "not-even-a-tag-kind").expect_err("should fail");
    assert!(err.to_string().contains("not valid") || matches!(err, crate::Error::MalformedTag(_)));
}
