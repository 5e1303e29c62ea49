//! The RTMP listener: accepts connections and hands each one to a fresh
//! `ServerSession` against the shared channel registry. Grounded on
//! `rtmp/server.go`, with the `streamhub` event producer replaced by a
//! direct `Arc<channel::App>` (spec §4.8).

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::channel::App;

use super::auth::AuthCallback;
use super::session::ServerSession;

const DEFAULT_MAX_CONNECTIONS: usize = 1000;

pub struct RtmpServer {
    address: String,
    app: Arc<App>,
    auth: Option<Arc<dyn AuthCallback>>,
    max_connections: usize,
}

impl RtmpServer {
    #[must_use]
    pub fn new(address: String, app: Arc<App>, auth: Option<Arc<dyn AuthCallback>>) -> Self {
        Self {
            address,
            app,
            auth,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub async fn run(&self) -> std::io::Result<()> {
        let socket_addr: SocketAddr = self.address.parse().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("invalid address '{}': {e}", self.address))
        })?;
        let listener = TcpListener::bind(&socket_addr).await?;
        let active_connections = Arc::new(AtomicUsize::new(0));

        tracing::info!("rtmp server listening on tcp://{socket_addr} (max_connections: {})", self.max_connections);
        loop {
            let (tcp_stream, remote_addr) = listener.accept().await?;

            let current = active_connections.load(Ordering::Relaxed);
            if current >= self.max_connections {
                tracing::warn!("rtmp connection rejected from {remote_addr}: at capacity ({current}/{})", self.max_connections);
                drop(tcp_stream);
                continue;
            }

            active_connections.fetch_add(1, Ordering::Relaxed);
            let conn_counter = active_connections.clone();
            let app = self.app.clone();
            let auth = self.auth.clone();

            tokio::spawn(async move {
                if let Err(err) = ServerSession::run(tcp_stream, app, auth).await {
                    tracing::info!("rtmp session from {remote_addr} ended: {err}");
                }
                conn_counter.fetch_sub(1, Ordering::Relaxed);
            });
        }
    }
}
