//! Control-Plane API Error Hierarchy
//!
//! Defines the error types shared by the server core, the watcher subsystem
//! and the client, categorized by protocol layer and operational concerns.

use serde::Deserialize;
use serde::Serialize;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Tag string does not parse as any known entity kind.
    /// Rejected locally, before any network or state access.
    #[error("{0:?} is not a valid tag")]
    MalformedTag(String),

    /// Target of an operation does not exist. Payload is the human-readable
    /// entity reference, e.g. `machine 42`. Safe to report verbatim.
    #[error("{0} not found")]
    EntityNotFound(String),

    /// Authentication or authorization failure. Deliberately uninformative:
    /// the same message covers a bad secret, a bad nonce and a missing role.
    #[error("permission denied")]
    PermissionDenied,

    /// Operation rejected because the server has begun stopping.
    #[error("shutdown in progress")]
    Shutdown,

    /// No handler registered for the requested facade/method pair.
    #[error("unknown operation {facade}.{method}")]
    UnknownOperation { facade: String, method: String },

    /// Malformed or incomplete request arguments.
    #[error("{0} not valid")]
    NotValid(String),

    /// Connection-level failures. Never retried by the core.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Structured error received over the wire from the remote side.
    #[error(transparent)]
    Request(RequestError),

    /// Configuration loading or validation failures.
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// Accounts file failed structural parsing.
    #[error("cannot unmarshal accounts: {0}")]
    CorruptAccounts(String),

    /// Unrecoverable failures requiring the caller to give up.
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was torn down (locally or by the peer) while a
    /// request was still outstanding.
    #[error("connection is shut down")]
    ConnectionClosed,

    /// Frame or envelope encoding/decoding failures.
    #[error("codec failure: {0}")]
    Codec(String),

    /// TLS material could not be loaded or the handshake failed.
    #[error("tls failure: {0}")]
    Tls(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stable error discriminant carried inside response envelopes so the client
/// can rebuild a typed error without parsing message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    MalformedTag,
    NotFound,
    PermissionDenied,
    Shutdown,
    UnknownOperation,
    NotValid,
    Internal,
}

/// Wire-level structured error: a stable code plus the verbatim message
/// reported to the caller (e.g. `machine 42 not found`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    /// Builds the not-found error for a cluster entity, identified by its
    /// human-readable reference (`machine 42`, not `machine-42`).
    pub fn entity_not_found(kind: &str, id: &str) -> Self {
        Error::EntityNotFound(format!("{kind} {id}"))
    }

    pub(crate) fn wire_code(&self) -> ErrorCode {
        match self {
            Error::MalformedTag(_) => ErrorCode::MalformedTag,
            Error::EntityNotFound(_) => ErrorCode::NotFound,
            Error::PermissionDenied => ErrorCode::PermissionDenied,
            Error::Shutdown => ErrorCode::Shutdown,
            Error::UnknownOperation { .. } => ErrorCode::UnknownOperation,
            Error::NotValid(_) => ErrorCode::NotValid,
            _ => ErrorCode::Internal,
        }
    }

    /// Converts the server-side error into its wire representation.
    pub(crate) fn to_wire(&self) -> RequestError {
        RequestError {
            code: self.wire_code(),
            message: self.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::EntityNotFound(_))
            || matches!(self, Error::Request(e) if e.code == ErrorCode::NotFound)
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::PermissionDenied)
            || matches!(self, Error::Request(e) if e.code == ErrorCode::PermissionDenied)
    }

    /// True for both valid observations of the shutdown race: an explicit
    /// shutdown rejection and a transport-level truncation.
    pub fn is_shutdown_or_transport(&self) -> bool {
        matches!(self, Error::Shutdown | Error::Transport(_))
            || matches!(self, Error::Request(e) if e.code == ErrorCode::Shutdown)
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        // Rebuild the typed variants callers are expected to match on; the
        // rest stay as structured request errors with the verbatim message.
        match e.code {
            ErrorCode::PermissionDenied => Error::PermissionDenied,
            ErrorCode::Shutdown => Error::Shutdown,
            _ => Error::Request(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Transport(TransportError::Io(e))
    }
}
