//! Sum-typed identifiers for addressable cluster entities.
//!
//! Every entity reachable through the API is named by a [`Tag`] with the
//! canonical string form `<kind>-<id>` (e.g. `machine-42`). Parsing is a
//! total function: any string either maps onto exactly one variant or fails
//! with [`Error::MalformedTag`] before anything touches the network or the
//! state store.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::Error;
use crate::errors::Result;

#[cfg(test)]
mod tag_test;

pub const MACHINE_TAG_KIND: &str = "machine";
pub const UNIT_TAG_KIND: &str = "unit";
pub const USER_TAG_KIND: &str = "user";

/// Identifier of one addressable cluster entity.
///
/// Immutable once constructed; cheap to clone and hash, and embedded
/// verbatim inside wire payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Machine(String),
    Unit(String),
    User(String),
}

impl Tag {
    /// Parses a canonical tag string into its typed form.
    pub fn parse(s: &str) -> Result<Tag> {
        let (kind, id) = match s.split_once('-') {
            Some(parts) => parts,
            None => return Err(Error::MalformedTag(s.to_string())),
        };
        if id.is_empty() {
            return Err(Error::MalformedTag(s.to_string()));
        }
        match kind {
            MACHINE_TAG_KIND => Ok(Tag::Machine(id.to_string())),
            UNIT_TAG_KIND => Ok(Tag::Unit(id.to_string())),
            USER_TAG_KIND => Ok(Tag::User(id.to_string())),
            _ => Err(Error::MalformedTag(s.to_string())),
        }
    }

    pub fn machine(id: impl Into<String>) -> Tag {
        Tag::Machine(id.into())
    }

    pub fn unit(name: impl Into<String>) -> Tag {
        Tag::Unit(name.into())
    }

    pub fn user(name: impl Into<String>) -> Tag {
        Tag::User(name.into())
    }

    /// The kind prefix: `machine`, `unit` or `user`.
    pub fn kind(&self) -> &'static str {
        match self {
            Tag::Machine(_) => MACHINE_TAG_KIND,
            Tag::Unit(_) => UNIT_TAG_KIND,
            Tag::User(_) => USER_TAG_KIND,
        }
    }

    /// The bare id, without the kind prefix. Used when reporting entities to
    /// humans ("machine 42 not found" references `42`, not `machine-42`).
    pub fn human_id(&self) -> &str {
        match self {
            Tag::Machine(id) | Tag::Unit(id) | Tag::User(id) => id,
        }
    }

    /// The not-found error for this entity, with the human-readable id.
    pub fn not_found(&self) -> Error {
        Error::entity_not_found(self.kind(), self.human_id())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind(), self.human_id())
    }
}
