//! Authenticated control-plane API server and client.
//!
//! The crate exposes a TLS-terminated, multiplexed request/response
//! protocol over one long-lived connection per client. Servers dispatch
//! requests to facades backed by a [`state::StateStore`]; clients keep a
//! correlation table of in-flight calls and surface server-pushed watcher
//! notifications as [`client::ClientWatcher`] streams.

pub mod auth;
pub mod client;
pub mod config;
mod errors;
pub mod facade;
pub mod network;
pub mod state;
pub mod tag;
pub mod watch;

pub use errors::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
