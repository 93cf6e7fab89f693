//! Operation argument and result payloads.
//!
//! Payloads travel inside request/response envelopes as bincode-encoded
//! structs; [`encode`]/[`decode`] are the only codec touchpoints handlers
//! use.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Error;
use crate::errors::Result;
use crate::errors::TransportError;

/// Facade and method names, kept in one place so client and server cannot
/// drift apart.
pub const ADMIN_FACADE: &str = "Admin";
pub const LOGIN_METHOD: &str = "Login";
pub const CREDENTIALS_FACADE: &str = "Credentials";
pub const AUTHORISED_KEYS_METHOD: &str = "AuthorisedKeys";
pub const WATCH_AUTHORISED_KEYS_METHOD: &str = "WatchAuthorisedKeys";
pub const NOTIFY_WATCHER_FACADE: &str = "NotifyWatcher";
pub const STOP_METHOD: &str = "Stop";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginArgs {
    pub auth_tag: String,
    pub credentials: String,
    pub nonce: Option<String>,
}

/// Arguments for operations that target a single entity by tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityArgs {
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopWatcherArgs {
    pub watcher_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorisedKeysResult {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchResult {
    pub watcher_id: u64,
}

/// Empty result marker for operations that return nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value)
        .map_err(|e| Error::Transport(TransportError::Codec(e.to_string())))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes)
        .map_err(|e| Error::Transport(TransportError::Codec(e.to_string())))
}
