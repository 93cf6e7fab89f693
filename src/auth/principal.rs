use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::tag::Tag;

/// A duty an entity may be assigned, granting capabilities over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Manages cluster state; required for the credentials-management
    /// operations.
    ManageState,
    /// Hosts units on the entity's machine.
    HostUnits,
}

/// The authenticated identity bound to one connection.
///
/// Created once at handshake time from the entity's assigned duties and
/// never refreshed for the life of the connection.
#[derive(Debug, Clone)]
pub struct Principal {
    tag: Tag,
    roles: HashSet<Role>,
}

impl Principal {
    pub fn new(tag: Tag, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            tag,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
