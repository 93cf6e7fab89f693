//! Shared setup for the integration suites.

use std::sync::Arc;

use castellan::auth::Role;
use castellan::facade::params::LoginArgs;
use castellan::facade::AUTHORIZED_KEYS_ATTR;
use castellan::network::generate_self_signed_certificates;
use castellan::network::ApiServer;
use castellan::state::AttributeKey;
use castellan::state::EntityRecord;
use castellan::state::MemoryState;
use castellan::tag::Tag;

pub const PASSWORD: &str = "password";
pub const NONCE: &str = "fake_nonce";

/// State with a privileged manager machine, an unprivileged worker machine
/// and three authorized keys on machine 0.
pub fn seeded_state() -> Arc<MemoryState> {
    let state = Arc::new(MemoryState::new());
    state.add_entity(EntityRecord {
        tag: Tag::machine("0"),
        secret: PASSWORD.to_string(),
        nonce: Some(NONCE.to_string()),
        roles: vec![Role::ManageState, Role::HostUnits],
    });
    state.add_entity(EntityRecord {
        tag: Tag::machine("1"),
        secret: PASSWORD.to_string(),
        nonce: None,
        roles: vec![Role::HostUnits],
    });
    state.set_attribute(
        AttributeKey::new(Tag::machine("0"), AUTHORIZED_KEYS_ATTR),
        "k1\nk2\nk3",
    );
    state
}

pub fn manager_login() -> LoginArgs {
    LoginArgs {
        auth_tag: "machine-0".to_string(),
        credentials: PASSWORD.to_string(),
        nonce: Some(NONCE.to_string()),
    }
}

// Not every suite logs in as the worker.
#[allow(dead_code)]
pub fn worker_login() -> LoginArgs {
    LoginArgs {
        auth_tag: "machine-1".to_string(),
        credentials: PASSWORD.to_string(),
        nonce: None,
    }
}

/// Binds a server on an ephemeral port and returns it with its address
/// string and the certificate clients must trust.
pub async fn start_server(state: Arc<MemoryState>) -> (ApiServer, String, Vec<u8>) {
    let (cert, key) = generate_self_signed_certificates(vec!["localhost".to_string()])
        .expect("certificate generation failed");
    let server = ApiServer::bind(state, "127.0.0.1:0", &cert, &key)
        .await
        .expect("server bind failed");
    let addr = server.addr().to_string();
    (server, addr, cert)
}
