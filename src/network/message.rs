use serde::Deserialize;
use serde::Serialize;

use crate::errors::RequestError;

/// Inbound envelope: one remote call, tagged with the correlation id the
/// caller uses to match the (possibly out-of-order) completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    Request {
        request_id: u64,
        facade: String,
        method: String,
        params: Vec<u8>,
    },
}

/// Outbound envelope: either the completion of one request or an
/// out-of-band watcher notification. Notifications carry no value; the
/// client re-fetches the current state on receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    Response {
        request_id: u64,
        result: Result<Vec<u8>, RequestError>,
    },
    Notification {
        watcher_id: u64,
    },
}
