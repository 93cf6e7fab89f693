use std::sync::Arc;

use super::server::ApiServer;
use crate::state::MemoryState;
use crate::test_utils::seeded_state;
use crate::test_utils::start_test_server;
use crate::test_utils::test_certificate;

#[tokio::test]
async fn bind_reports_the_effective_ephemeral_port() {
    let (server, _) = start_test_server(seeded_state()).await.unwrap();
    assert_ne!(server.addr().port(), 0);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn bind_rejects_unusable_tls_material() {
    let state: Arc<MemoryState> = seeded_state();
    let result = ApiServer::bind(state, "127.0.0.1:0", b"bogus", b"bogus").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn bind_rejects_unusable_address() {
    let (cert, key) = test_certificate();
    let result = ApiServer::bind(seeded_state(), "256.0.0.1:0", &cert, &key).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn stop_twice_is_harmless() {
    let (server, _) = start_test_server(seeded_state()).await.unwrap();
    server.stop().await.unwrap();
    server.stop().await.unwrap();
}
