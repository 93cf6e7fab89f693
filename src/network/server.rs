//! API server lifecycle.
//!
//! The server binds its listener at construction time and serves every
//! accepted connection on an independent task. Shutdown is a two-phase
//! state machine: `Running → Draining → Stopped`. Requests are admitted
//! only while `Running`; `Draining` rejects new admissions with a shutdown
//! error while in-flight work races connection teardown, so a caller may
//! observe success, a shutdown error, or a truncated transport; all three
//! are legitimate.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::connection::serve_connection;
use super::tls;
use crate::auth::Authenticator;
use crate::config::ServerSettings;
use crate::errors::Error;
use crate::errors::Result;
use crate::facade::Dispatcher;
use crate::state::StateStore;
use crate::watch::WatcherManager;

pub(crate) const PHASE_RUNNING: u8 = 0;
pub(crate) const PHASE_DRAINING: u8 = 1;
pub(crate) const PHASE_STOPPED: u8 = 2;

/// State shared between the accept loop and every connection task.
pub(crate) struct ServerCore {
    pub authenticator: Authenticator,
    pub dispatcher: Dispatcher,
    pub phase: AtomicU8,
    pub settings: ServerSettings,
}

/// The control-plane API server.
pub struct ApiServer {
    addr: SocketAddr,
    core: Arc<ServerCore>,
    cancel: CancellationToken,
    accept_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ApiServer {
    /// Binds the listening socket and starts serving connections.
    ///
    /// Fails immediately if the address is unusable or the certificate/key
    /// pair is invalid. `":0"`-style addresses bind an ephemeral port;
    /// [`addr`](ApiServer::addr) reports the effective one.
    pub async fn bind(
        state: Arc<dyn StateStore>,
        bind_address: &str,
        cert_pem: &[u8],
        key_pem: &[u8],
    ) -> Result<ApiServer> {
        Self::bind_with_settings(state, bind_address, cert_pem, key_pem, ServerSettings::default()).await
    }

    pub async fn bind_with_settings(
        state: Arc<dyn StateStore>,
        bind_address: &str,
        cert_pem: &[u8],
        key_pem: &[u8],
        settings: ServerSettings,
    ) -> Result<ApiServer> {
        let tls_config = tls::server_config(cert_pem, key_pem)?;
        let listener = TcpListener::bind(bind_address).await?;
        let addr = listener.local_addr()?;

        let watchers = Arc::new(WatcherManager::new(state.clone()));
        let core = Arc::new(ServerCore {
            authenticator: Authenticator::new(state.clone()),
            dispatcher: Dispatcher::new(state, watchers),
            phase: AtomicU8::new(PHASE_RUNNING),
            settings,
        });

        let cancel = CancellationToken::new();
        let accept_handle = tokio::spawn(accept_loop(
            listener,
            TlsAcceptor::from(tls_config),
            core.clone(),
            cancel.clone(),
        ));

        info!("api server listening on {}", addr);
        Ok(ApiServer {
            addr,
            core,
            cancel,
            accept_handle: Mutex::new(Some(accept_handle)),
        })
    }

    /// The effective bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Gracefully stops the server: ceases accepting, signals every live
    /// connection and watcher to terminate, and blocks until teardown
    /// completes. Idempotent: a second call after the first finished
    /// returns `Ok` and performs no further work.
    pub async fn stop(&self) -> Result<()> {
        let handle = self.accept_handle.lock().await.take();
        let Some(handle) = handle else {
            debug!("api server on {} already stopped", self.addr);
            return Ok(());
        };

        info!("stopping api server on {}", self.addr);
        self.core.phase.store(PHASE_DRAINING, Ordering::Release);
        self.cancel.cancel();
        self.core.dispatcher.watchers().stop_all();
        handle
            .await
            .map_err(|e| Error::Fatal(format!("accept loop terminated abnormally: {e}")))?;
        self.core.phase.store(PHASE_STOPPED, Ordering::Release);
        info!("api server on {} stopped", self.addr);
        Ok(())
    }
}

async fn accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    core: Arc<ServerCore>,
    cancel: CancellationToken,
) {
    let mut connections = JoinSet::new();
    loop {
        select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => {
                match accepted {
                    Ok((tcp, peer)) => {
                        if core.settings.network.tcp_nodelay {
                            let _ = tcp.set_nodelay(true);
                        }
                        let acceptor = acceptor.clone();
                        let core = core.clone();
                        let conn_cancel = cancel.child_token();
                        connections.spawn(async move {
                            match acceptor.accept(tcp).await {
                                Ok(stream) => {
                                    serve_connection(core, stream, peer, conn_cancel).await;
                                }
                                Err(e) => warn!("tls handshake with {} failed: {}", peer, e),
                            }
                        });
                    }
                    Err(e) => warn!("accept failed: {}", e),
                }
            }
        }
    }
    // Stop accepting, then wait for every connection task to finish.
    drop(listener);
    while connections.join_next().await.is_some() {}
    debug!("accept loop finished");
}
