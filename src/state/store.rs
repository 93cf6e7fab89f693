use tokio::sync::broadcast;

use crate::auth::Role;
use crate::errors::Result;
use crate::tag::Tag;

/// Server-side stored credentials and duties for one entity.
///
/// Owned by the state layer; the core only ever reads it.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub tag: Tag,
    /// Stored secret the presented credentials are checked against.
    pub secret: String,
    /// Provisioning nonce. When present the entity is still being
    /// provisioned and authentication must also match the nonce.
    pub nonce: Option<String>,
    /// Duties assigned to the entity, from which connection roles derive.
    pub roles: Vec<Role>,
}

/// Reference to one named piece of mutable state scoped to an entity,
/// e.g. the `authorized-keys` attribute of `machine-0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    pub tag: Tag,
    pub name: String,
}

impl AttributeKey {
    pub fn new(tag: Tag, name: impl Into<String>) -> Self {
        Self { tag, name: name.into() }
    }
}

/// Raw change-feed event. The store emits one per write, whether or not the
/// externally visible value changed; revisions advance monotonically.
/// Deduplication by value is the watcher subsystem's job.
#[derive(Debug, Clone)]
pub struct AttributeEvent {
    pub key: AttributeKey,
    pub revision: u64,
}

/// The already-existing cluster state store, as seen by the core.
///
/// Reads return a single consistent snapshot; the core owns no transaction
/// or locking discipline over the store and relies on [`subscribe`] for
/// notification ordering.
///
/// [`subscribe`]: StateStore::subscribe
pub trait StateStore: Send + Sync + 'static {
    /// Looks up the credential record for an entity, if one exists.
    fn entity(&self, tag: &Tag) -> Option<EntityRecord>;

    /// Reads the current value of a watched attribute. Attributes an entity
    /// has never written read as the empty string; an unknown owning entity
    /// is an [`EntityNotFound`](crate::Error::EntityNotFound) error.
    fn attribute(&self, key: &AttributeKey) -> Result<String>;

    /// Subscribes to the raw change feed for all attributes.
    fn subscribe(&self) -> broadcast::Receiver<AttributeEvent>;
}
