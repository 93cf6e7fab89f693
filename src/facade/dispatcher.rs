use std::sync::Arc;

use tracing::debug;

use super::credentials;
use super::params;
use super::params::AuthorisedKeysResult;
use super::params::Empty;
use super::params::EntityArgs;
use super::params::StopWatcherArgs;
use super::params::WatchResult;
use crate::auth::Principal;
use crate::auth::Role;
use crate::errors::Error;
use crate::errors::Result;
use crate::state::StateStore;
use crate::watch::NotifyWatcher;
use crate::watch::WatcherManager;

/// Receives the live watchers an operation creates, so the owning
/// connection can pump their notifications out-of-band and stop them when
/// it closes.
pub trait WatcherSink: Send + Sync {
    fn register(&self, watcher: NotifyWatcher);
}

/// Maps `(facade, method)` pairs onto handlers after the capability check.
pub struct Dispatcher {
    state: Arc<dyn StateStore>,
    watchers: Arc<WatcherManager>,
}

impl Dispatcher {
    pub fn new(state: Arc<dyn StateStore>, watchers: Arc<WatcherManager>) -> Self {
        Self { state, watchers }
    }

    pub fn watchers(&self) -> &Arc<WatcherManager> {
        &self.watchers
    }

    /// The role an operation demands, or `None` when a valid login alone is
    /// enough. Unknown operations are resolved later so probing a bogus
    /// name without the role still reads as a capability failure.
    fn required_role(facade: &str) -> Option<Role> {
        match facade {
            params::CREDENTIALS_FACADE => Some(Role::ManageState),
            _ => None,
        }
    }

    /// Routes one authenticated request. The role check precedes argument
    /// decoding and validation; all failures map onto typed errors.
    pub fn dispatch(
        &self,
        principal: &Principal,
        facade: &str,
        method: &str,
        request_params: &[u8],
        sink: &dyn WatcherSink,
    ) -> Result<Vec<u8>> {
        if let Some(role) = Self::required_role(facade) {
            if !principal.has_role(role) {
                debug!("dispatch: {} denied {}.{}", principal.tag(), facade, method);
                return Err(Error::PermissionDenied);
            }
        }

        match (facade, method) {
            (params::CREDENTIALS_FACADE, params::AUTHORISED_KEYS_METHOD) => {
                let args: EntityArgs = params::decode(request_params)?;
                let keys = credentials::authorised_keys(&self.state, &args.tag)?;
                params::encode(&AuthorisedKeysResult { keys })
            }
            (params::CREDENTIALS_FACADE, params::WATCH_AUTHORISED_KEYS_METHOD) => {
                let args: EntityArgs = params::decode(request_params)?;
                let watcher = credentials::watch_authorised_keys(&self.watchers, &args.tag)?;
                let watcher_id = watcher.id();
                sink.register(watcher);
                params::encode(&WatchResult { watcher_id })
            }
            (params::NOTIFY_WATCHER_FACADE, params::STOP_METHOD) => {
                let args: StopWatcherArgs = params::decode(request_params)?;
                self.watchers.stop(args.watcher_id);
                params::encode(&Empty {})
            }
            _ => Err(Error::UnknownOperation {
                facade: facade.to_string(),
                method: method.to_string(),
            }),
        }
    }
}
