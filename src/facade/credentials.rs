use std::sync::Arc;

use crate::errors::Error;
use crate::errors::Result;
use crate::state::AttributeKey;
use crate::state::StateStore;
use crate::tag::Tag;
use crate::watch::NotifyWatcher;
use crate::watch::WatcherManager;

/// Attribute carrying a machine's SSH authorized keys: a single string with
/// one key per line.
pub const AUTHORIZED_KEYS_ATTR: &str = "authorized-keys";

/// Parses and validates the machine tag argument of the credentials
/// operations.
fn machine_tag(raw: &str) -> Result<Tag> {
    let tag = Tag::parse(raw)?;
    match tag {
        Tag::Machine(_) => Ok(tag),
        _ => Err(Error::NotValid(format!("tag {tag:?}"))),
    }
}

/// Reads the target machine's authorized keys as an ordered sequence.
///
/// The raw attribute is split on newlines only; entries are preserved in
/// order and never trimmed beyond the split boundary.
pub fn authorised_keys(state: &Arc<dyn StateStore>, raw_tag: &str) -> Result<Vec<String>> {
    let tag = machine_tag(raw_tag)?;
    let keys = state.attribute(&AttributeKey::new(tag, AUTHORIZED_KEYS_ATTR))?;
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    Ok(keys.split('\n').map(str::to_string).collect())
}

/// Starts a watcher on the target machine's authorized keys.
pub fn watch_authorised_keys(watchers: &WatcherManager, raw_tag: &str) -> Result<NotifyWatcher> {
    let tag = machine_tag(raw_tag)?;
    watchers.watch(AttributeKey::new(tag, AUTHORIZED_KEYS_ATTR))
}
