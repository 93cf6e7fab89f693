use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use futures::SinkExt;
use futures::StreamExt;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio_rustls::TlsConnector;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::errors::Error;
use crate::errors::Result;
use crate::errors::TransportError;
use crate::facade::params;
use crate::facade::params::AuthorisedKeysResult;
use crate::facade::params::Empty;
use crate::facade::params::EntityArgs;
use crate::facade::params::LoginArgs;
use crate::facade::params::StopWatcherArgs;
use crate::facade::params::WatchResult;
use crate::network::codec;
use crate::network::tls;
use crate::network::ClientMessage;
use crate::network::ServerMessage;
use crate::tag::Tag;

/// Frame cap mirroring the server default.
const MAX_FRAME_BYTES: usize = 1024 * 1024;
/// Depth of the client's outbound request queue.
const OUTBOUND_QUEUE: usize = 64;

type PendingSlot = oneshot::Sender<Result<Vec<u8>>>;

struct ClientInner {
    out_tx: mpsc::Sender<ClientMessage>,
    /// Correlation table: request id to the slot its completion resolves.
    pending: DashMap<u64, PendingSlot>,
    /// Live watcher marker channels, keyed by server-issued watcher id.
    notifications: DashMap<u64, mpsc::Sender<()>>,
    /// Markers that raced ahead of their `Watch*` completion.
    early_markers: DashMap<u64, ()>,
    next_request_id: AtomicU64,
    cancel: CancellationToken,
    closed: AtomicBool,
}

impl ClientInner {
    fn fail_pending(&self) {
        self.closed.store(true, Ordering::Release);
        let ids: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Some((_, slot)) = self.pending.remove(&id) {
                let _ = slot.send(Err(Error::Transport(TransportError::ConnectionClosed)));
            }
        }
        // Closing the marker channels ends every live watcher stream.
        self.notifications.clear();
    }

    async fn call(&self, facade: &str, method: &str, params: Vec<u8>) -> Result<Vec<u8>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Transport(TransportError::ConnectionClosed));
        }
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(request_id, tx);

        let msg = ClientMessage::Request {
            request_id,
            facade: facade.to_string(),
            method: method.to_string(),
            params,
        };
        if self.out_tx.send(msg).await.is_err() {
            self.pending.remove(&request_id);
            return Err(Error::Transport(TransportError::ConnectionClosed));
        }
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::Transport(TransportError::ConnectionClosed)),
        }
    }
}

/// Client for the control-plane API.
///
/// One TLS connection multiplexes every concurrent call; completions are
/// matched to callers by correlation id and may resolve out of order.
/// Watcher notifications arriving out-of-band are routed to the
/// [`ClientWatcher`] they belong to.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("pending", &self.inner.pending.len())
            .field("closed", &self.inner.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Opens the TLS connection (trusting exactly the supplied CA/server
    /// certificate), performs the `Admin.Login` handshake and returns the
    /// ready client.
    pub async fn connect(
        addr: &str,
        server_name: &str,
        ca_pem: &[u8],
        login: LoginArgs,
    ) -> Result<ApiClient> {
        let tls_config = tls::client_config(ca_pem)?;
        let domain = ServerName::try_from(server_name.to_string())
            .map_err(|e| Error::Transport(TransportError::Tls(format!("invalid server name: {e}"))))?;
        let tcp = TcpStream::connect(addr).await?;
        let stream = TlsConnector::from(tls_config).connect(domain, tcp).await?;

        let framed = codec::frame(stream, MAX_FRAME_BYTES);
        let (mut sink, mut inbound) = framed.split();
        let (out_tx, mut out_rx) = mpsc::channel::<ClientMessage>(OUTBOUND_QUEUE);

        let inner = Arc::new(ClientInner {
            out_tx,
            pending: DashMap::new(),
            notifications: DashMap::new(),
            early_markers: DashMap::new(),
            next_request_id: AtomicU64::new(1),
            cancel: CancellationToken::new(),
            closed: AtomicBool::new(false),
        });

        let writer_cancel = inner.cancel.clone();
        tokio::spawn(async move {
            loop {
                select! {
                    _ = writer_cancel.cancelled() => break,
                    msg = out_rx.recv() => {
                        let Some(msg) = msg else { break };
                        let body = match codec::encode_envelope(&msg) {
                            Ok(b) => b,
                            Err(e) => {
                                warn!("client encode failed: {}", e);
                                break;
                            }
                        };
                        if sink.send(body).await.is_err() {
                            break;
                        }
                    }
                }
            }
            let _ = sink.close().await;
        });

        let reader_inner = inner.clone();
        tokio::spawn(async move {
            loop {
                select! {
                    _ = reader_inner.cancel.cancelled() => break,
                    frame = inbound.next() => {
                        let frame = match frame {
                            Some(Ok(f)) => f,
                            Some(Err(e)) => {
                                debug!("client read failed: {}", e);
                                break;
                            }
                            None => break,
                        };
                        let msg: ServerMessage = match codec::decode_envelope(&frame) {
                            Ok(m) => m,
                            Err(e) => {
                                warn!("client got bad envelope: {}", e);
                                break;
                            }
                        };
                        match msg {
                            ServerMessage::Response { request_id, result } => {
                                if let Some((_, slot)) = reader_inner.pending.remove(&request_id) {
                                    let _ = slot.send(result.map_err(Error::from));
                                }
                            }
                            ServerMessage::Notification { watcher_id } => {
                                match reader_inner.notifications.get(&watcher_id) {
                                    // Full mailbox: a marker is already
                                    // pending for this watcher.
                                    Some(tx) => {
                                        let _ = tx.try_send(());
                                    }
                                    None => {
                                        reader_inner.early_markers.insert(watcher_id, ());
                                    }
                                }
                            }
                        }
                    }
                }
            }
            reader_inner.fail_pending();
        });

        let client = ApiClient { inner };
        let raw = params::encode(&login)?;
        let response = client
            .inner
            .call(params::ADMIN_FACADE, params::LOGIN_METHOD, raw)
            .await;
        match response {
            Ok(body) => {
                let _: Empty = params::decode(&body)?;
                Ok(client)
            }
            Err(e) => {
                client.close();
                Err(e)
            }
        }
    }

    /// Fetches the ordered authorized-keys sequence of one machine.
    pub async fn authorised_keys(&self, machine: &Tag) -> Result<Vec<String>> {
        let raw = params::encode(&EntityArgs { tag: machine.to_string() })?;
        let body = self
            .inner
            .call(params::CREDENTIALS_FACADE, params::AUTHORISED_KEYS_METHOD, raw)
            .await?;
        let result: AuthorisedKeysResult = params::decode(&body)?;
        Ok(result.keys)
    }

    /// Starts a watcher on one machine's authorized keys and returns the
    /// local handle its notifications are delivered through.
    pub async fn watch_authorised_keys(&self, machine: &Tag) -> Result<ClientWatcher> {
        let raw = params::encode(&EntityArgs { tag: machine.to_string() })?;
        let body = self
            .inner
            .call(params::CREDENTIALS_FACADE, params::WATCH_AUTHORISED_KEYS_METHOD, raw)
            .await?;
        let result: WatchResult = params::decode(&body)?;
        let id = result.watcher_id;

        let (tx, rx) = mpsc::channel(1);
        if self.inner.early_markers.remove(&id).is_some() {
            let _ = tx.try_send(());
        }
        self.inner.notifications.insert(id, tx);
        // A marker may have slipped in between the two map operations.
        if self.inner.early_markers.remove(&id).is_some() {
            if let Some(tx) = self.inner.notifications.get(&id) {
                let _ = tx.try_send(());
            }
        }
        Ok(ClientWatcher {
            id,
            changes: rx,
            inner: self.inner.clone(),
        })
    }

    /// Tears the connection down. Outstanding calls fail with a transport
    /// error; live watcher streams close.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.cancel.cancel();
        self.inner.fail_pending();
    }
}

/// Client-side handle of one server watcher.
pub struct ClientWatcher {
    id: u64,
    changes: mpsc::Receiver<()>,
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ClientWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientWatcher").field("id", &self.id).finish_non_exhaustive()
    }
}

impl ClientWatcher {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Awaits the next change marker; `None` once the watcher (or the
    /// connection) is gone. The marker carries no value: re-fetch the
    /// current state on receipt.
    pub async fn next(&mut self) -> Option<()> {
        self.changes.recv().await
    }

    /// Stops the server-side watcher. Idempotent on the server; the local
    /// stream closes once the connection drops the marker channel.
    pub async fn stop(&self) -> Result<()> {
        let raw = params::encode(&StopWatcherArgs { watcher_id: self.id })?;
        let body = self
            .inner
            .call(params::NOTIFY_WATCHER_FACADE, params::STOP_METHOD, raw)
            .await?;
        let _: Empty = params::decode(&body)?;
        self.inner.notifications.remove(&self.id);
        Ok(())
    }
}
