//! Shared fixtures for unit and integration tests.

use std::sync::Arc;

use crate::auth::Role;
use crate::config::ServerSettings;
use crate::errors::Result;
use crate::facade::params::LoginArgs;
use crate::network::generate_self_signed_certificates;
use crate::network::ApiServer;
use crate::state::EntityRecord;
use crate::state::MemoryState;
use crate::tag::Tag;

pub const MANAGER_MACHINE: &str = "machine-0";
pub const WORKER_MACHINE: &str = "machine-1";
pub const TEST_PASSWORD: &str = "password";
pub const TEST_NONCE: &str = "fake_nonce";

/// A self-signed certificate/key pair for `localhost`, fresh per call.
pub fn test_certificate() -> (Vec<u8>, Vec<u8>) {
    generate_self_signed_certificates(vec!["localhost".to_string()])
        .expect("certificate generation failed")
}

/// State seeded with a state-manager machine (provisioned, nonce-gated), a
/// plain worker machine and an admin user.
pub fn seeded_state() -> Arc<MemoryState> {
    let state = Arc::new(MemoryState::new());
    state.add_entity(EntityRecord {
        tag: Tag::machine("0"),
        secret: TEST_PASSWORD.to_string(),
        nonce: Some(TEST_NONCE.to_string()),
        roles: vec![Role::ManageState, Role::HostUnits],
    });
    state.add_entity(EntityRecord {
        tag: Tag::machine("1"),
        secret: TEST_PASSWORD.to_string(),
        nonce: None,
        roles: vec![Role::HostUnits],
    });
    state.add_entity(EntityRecord {
        tag: Tag::user("admin"),
        secret: "hunter2".to_string(),
        nonce: None,
        roles: vec![Role::ManageState],
    });
    state
}

/// Login arguments for the seeded state-manager machine.
pub fn manager_login() -> LoginArgs {
    LoginArgs {
        auth_tag: MANAGER_MACHINE.to_string(),
        credentials: TEST_PASSWORD.to_string(),
        nonce: Some(TEST_NONCE.to_string()),
    }
}

/// Login arguments for the seeded unprivileged worker machine.
pub fn worker_login() -> LoginArgs {
    LoginArgs {
        auth_tag: WORKER_MACHINE.to_string(),
        credentials: TEST_PASSWORD.to_string(),
        nonce: None,
    }
}

/// Binds a server on an ephemeral localhost port. Returns the server plus
/// the PEM certificate clients must trust.
pub async fn start_test_server(state: Arc<MemoryState>) -> Result<(ApiServer, Vec<u8>)> {
    let (cert, key) = test_certificate();
    let server = ApiServer::bind_with_settings(
        state,
        "127.0.0.1:0",
        &cert,
        &key,
        ServerSettings::default(),
    )
    .await?;
    Ok((server, cert))
}
