//! Wire protocol, connection handling and the API server itself.
//!
//! The transport is a TLS stream carrying length-delimited frames, each
//! holding one bincode-encoded envelope. A connection multiplexes many
//! in-flight requests matched by correlation id; watcher notifications are
//! pushed out-of-band on the same stream keyed by watcher id.

pub(crate) mod codec;
mod connection;
mod message;
mod server;
pub(crate) mod tls;

pub use codec::*;
pub use message::*;
pub use server::*;
pub use tls::generate_self_signed_certificates;


#[cfg(test)]
mod tls_test;

#[cfg(test)]
mod server_test;
