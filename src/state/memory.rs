use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use super::AttributeEvent;
use super::AttributeKey;
use super::EntityRecord;
use super::StateStore;
use crate::errors::Result;
use crate::tag::Tag;

/// Capacity of the raw change-feed channel. Watchers that fall this far
/// behind observe a lagged receiver and resynchronize from the live value.
const CHANGE_FEED_CAPACITY: usize = 256;

/// In-memory [`StateStore`] adapter.
///
/// Backs the test suites and embedded single-process deployments. Every
/// write bumps the attribute revision and lands on the change feed, even
/// when the value is unchanged, mirroring the raw feed of a real store.
pub struct MemoryState {
    entities: RwLock<HashMap<Tag, EntityRecord>>,
    attributes: RwLock<HashMap<AttributeKey, (String, u64)>>,
    feed: broadcast::Sender<AttributeEvent>,
}

impl MemoryState {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            entities: RwLock::new(HashMap::new()),
            attributes: RwLock::new(HashMap::new()),
            feed,
        }
    }

    /// Registers an entity, replacing any previous record under the same tag.
    pub fn add_entity(&self, record: EntityRecord) {
        debug!("add_entity: {}", record.tag);
        self.entities.write().insert(record.tag.clone(), record);
    }

    /// Writes an attribute value. The revision advances and a raw event is
    /// emitted on every write, including writes of an identical value.
    pub fn set_attribute(&self, key: AttributeKey, value: impl Into<String>) {
        let revision = {
            let mut attributes = self.attributes.write();
            let slot = attributes.entry(key.clone()).or_insert((String::new(), 0));
            slot.0 = value.into();
            slot.1 += 1;
            slot.1
        };
        // Send fails only when nobody subscribes, which is not an error.
        let _ = self.feed.send(AttributeEvent { key, revision });
    }
}

impl Default for MemoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for MemoryState {
    fn entity(&self, tag: &Tag) -> Option<EntityRecord> {
        self.entities.read().get(tag).cloned()
    }

    fn attribute(&self, key: &AttributeKey) -> Result<String> {
        if !self.entities.read().contains_key(&key.tag) {
            return Err(key.tag.not_found());
        }
        let attributes = self.attributes.read();
        Ok(attributes.get(key).map(|(v, _)| v.clone()).unwrap_or_default())
    }

    fn subscribe(&self) -> broadcast::Receiver<AttributeEvent> {
        self.feed.subscribe()
    }
}
