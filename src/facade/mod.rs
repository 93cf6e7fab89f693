//! Facades: named groups of remote-callable operations.
//!
//! Inbound requests arrive as `(facade, method, params)` triples. The
//! [`Dispatcher`] routes them to a handler after the capability check; the
//! role gate always runs before argument decoding, so an under-privileged
//! caller learns nothing about argument validity.

mod credentials;
mod dispatcher;
pub mod params;

pub use credentials::*;
pub use dispatcher::*;

#[cfg(test)]
mod credentials_test;
