//! Change-notification watchers.
//!
//! A [`NotifyWatcher`] is a live subscription to one watched attribute. The
//! [`WatcherManager`] multiplexes many watchers over the state store's raw
//! change feed, coalescing bursts so that a subscriber sees exactly one
//! notification per distinct value actually delivered: the delivery path is
//! a single-slot mailbox holding at most the latest undelivered marker.
//!
//! Each watcher runs as its own background task with its own cursor; no two
//! watchers share mutable state.

mod manager;
mod notify;

pub use manager::*;
pub use notify::*;

#[cfg(test)]
mod manager_test;
