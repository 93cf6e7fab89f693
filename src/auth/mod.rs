//! Connection authentication and authorization.
//!
//! [`Authenticator`] validates the opening handshake of a connection against
//! the credential records in the state store and mints a [`Principal`]: the
//! immutable identity-plus-roles the facade dispatcher consults for every
//! subsequent capability check.

mod authenticator;
mod principal;

pub use authenticator::*;
pub use principal::*;
