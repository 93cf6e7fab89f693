use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use super::Principal;
use crate::errors::Error;
use crate::errors::Result;
use crate::state::StateStore;
use crate::tag::Tag;

/// Validates presented identities against stored credential records.
pub struct Authenticator {
    state: Arc<dyn StateStore>,
}

impl Authenticator {
    pub fn new(state: Arc<dyn StateStore>) -> Self {
        Self { state }
    }

    /// Checks the presented tag/secret pair, plus the provisioning nonce for
    /// entities still being provisioned, and mints the connection principal.
    ///
    /// An unknown entity is reported by its human-readable id. Every
    /// credential mismatch collapses into the same opaque
    /// [`Error::PermissionDenied`] so a probing caller cannot tell which
    /// check failed.
    pub fn authenticate(&self, tag: &Tag, secret: &str, nonce: Option<&str>) -> Result<Principal> {
        let record = match self.state.entity(tag) {
            Some(r) => r,
            None => {
                debug!("authenticate: no such entity {}", tag);
                return Err(tag.not_found());
            }
        };

        if record.secret != secret {
            warn!("authenticate: credential mismatch for {}", tag);
            return Err(Error::PermissionDenied);
        }
        if let Some(required) = record.nonce.as_deref() {
            if nonce != Some(required) {
                warn!("authenticate: nonce mismatch for {}", tag);
                return Err(Error::PermissionDenied);
            }
        }

        debug!("authenticate: {} logged in", tag);
        Ok(Principal::new(tag.clone(), record.roles.iter().copied()))
    }
}
