//! Per-connection request handling.
//!
//! Each accepted connection runs [`serve_connection`] on its own task: a
//! reader loop admits requests, a writer task owns the outbound half of the
//! stream, and every admitted request is dispatched on its own task so
//! completions may land out of order, matched by correlation id. Watchers
//! created by this connection pump their markers through the same outbound
//! queue and are stopped when the connection goes away.

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::SinkExt;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::mpsc;
use tokio_rustls::server::TlsStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use super::codec;
use super::message::ClientMessage;
use super::message::ServerMessage;
use super::server::ServerCore;
use super::server::PHASE_RUNNING;
use crate::auth::Principal;
use crate::errors::Error;
use crate::errors::Result;
use crate::facade::params;
use crate::facade::params::Empty;
use crate::facade::params::LoginArgs;
use crate::facade::WatcherSink;
use crate::tag::Tag;
use crate::watch::NotifyWatcher;

/// Pumps markers from watchers owned by one connection into its outbound
/// queue, and remembers their ids so connection teardown can stop them.
struct ConnWatcherSink {
    outbound: mpsc::Sender<ServerMessage>,
    cancel: CancellationToken,
    owned: Arc<Mutex<Vec<u64>>>,
}

impl WatcherSink for ConnWatcherSink {
    fn register(&self, mut watcher: NotifyWatcher) {
        let watcher_id = watcher.id();
        self.owned.lock().push(watcher_id);
        let outbound = self.outbound.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                select! {
                    _ = cancel.cancelled() => break,
                    marker = watcher.next() => match marker {
                        Some(()) => {
                            if outbound.send(ServerMessage::Notification { watcher_id }).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            // Dropping the watcher here cancels its subscription.
        });
    }
}

fn handle_login(core: &ServerCore, facade: &str, method: &str, raw: &[u8]) -> Result<Principal> {
    if facade != params::ADMIN_FACADE || method != params::LOGIN_METHOD {
        // Nothing but the handshake is callable before authentication.
        return Err(Error::PermissionDenied);
    }
    let args: LoginArgs = params::decode(raw)?;
    let tag = Tag::parse(&args.auth_tag)?;
    core.authenticator.authenticate(&tag, &args.credentials, args.nonce.as_deref())
}

/// Serves one authenticated connection until the peer disconnects or the
/// server begins stopping.
pub(crate) async fn serve_connection(
    core: Arc<ServerCore>,
    stream: TlsStream<TcpStream>,
    peer: SocketAddr,
    cancel: CancellationToken,
) {
    debug!("connection from {}", peer);
    let framed = codec::frame(stream, core.settings.network.max_frame_bytes);
    let (mut sink, mut inbound) = framed.split();

    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(core.settings.network.outbound_queue);
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let body = match codec::encode_envelope(&msg) {
                Ok(b) => b,
                Err(e) => {
                    warn!("encode failed, closing connection: {}", e);
                    break;
                }
            };
            if sink.send(body).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let owned = Arc::new(Mutex::new(Vec::new()));
    let watcher_sink: Arc<dyn WatcherSink> = Arc::new(ConnWatcherSink {
        outbound: out_tx.clone(),
        cancel: cancel.clone(),
        owned: owned.clone(),
    });

    let mut principal: Option<Arc<Principal>> = None;
    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!("connection {}: server stopping", peer);
                break;
            }
            frame = inbound.next() => {
                let frame = match frame {
                    Some(Ok(f)) => f,
                    Some(Err(e)) => {
                        warn!("connection {}: read failed: {}", peer, e);
                        break;
                    }
                    None => {
                        debug!("connection {}: closed by peer", peer);
                        break;
                    }
                };
                let ClientMessage::Request { request_id, facade, method, params: raw } =
                    match codec::decode_envelope(&frame) {
                        Ok(m) => m,
                        Err(e) => {
                            warn!("connection {}: bad envelope: {}", peer, e);
                            break;
                        }
                    };

                // Admission: only a Running server takes on new work.
                if core.phase.load(Ordering::Acquire) != PHASE_RUNNING {
                    let msg = ServerMessage::Response {
                        request_id,
                        result: Err(Error::Shutdown.to_wire()),
                    };
                    if out_tx.send(msg).await.is_err() {
                        break;
                    }
                    continue;
                }

                match &principal {
                    None => {
                        // Handshake: the first request must be Admin.Login.
                        let result = match handle_login(&core, &facade, &method, &raw) {
                            Ok(p) => {
                                principal = Some(Arc::new(p));
                                params::encode(&Empty {}).map_err(|e| e.to_wire())
                            }
                            Err(e) => Err(e.to_wire()),
                        };
                        if out_tx.send(ServerMessage::Response { request_id, result }).await.is_err() {
                            break;
                        }
                    }
                    Some(p) => {
                        let core = core.clone();
                        let principal = p.clone();
                        let sink = watcher_sink.clone();
                        let out = out_tx.clone();
                        tokio::spawn(async move {
                            let result = core
                                .dispatcher
                                .dispatch(&principal, &facade, &method, &raw, sink.as_ref())
                                .map_err(|e| e.to_wire());
                            let _ = out.send(ServerMessage::Response { request_id, result }).await;
                        });
                    }
                }
            }
        }
    }

    // Teardown: stop forwarders and any watchers this connection created,
    // then let the writer drain and exit.
    cancel.cancel();
    for id in owned.lock().drain(..) {
        core.dispatcher.watchers().stop(id);
    }
    drop(watcher_sink);
    drop(out_tx);
    let _ = writer.await;
    debug!("connection {} finished", peer);
}
