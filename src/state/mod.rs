//! State-store boundary.
//!
//! The server core treats cluster state as an external collaborator: a
//! read-mostly credential/attribute store plus a raw change feed used by the
//! watcher subsystem. [`StateStore`] is the seam; [`MemoryState`] is the
//! in-process adapter backing tests and embedded deployments.

mod memory;
mod store;

pub use memory::*;
pub use store::*;

#[cfg(test)]
mod memory_test;
