//! Relay server listener
//!
//! Handles the TCP accept loop and spawns per-connection reader tasks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::registry::{Envelope, Peer, RoomRegistry};
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;

/// Chat relay server
pub struct RelayServer {
    config: ServerConfig,
    registry: Arc<RoomRegistry>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl RelayServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            registry: Arc::new(RoomRegistry::new()),
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the room registry
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Run the server
    ///
    /// Binds the configured address and serves until process termination.
    /// Returns an error only on bind/listen failure; per-peer faults are
    /// handled by evicting the one peer involved.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Chat relay listening");

        self.accept_loop(&listener).await
    }

    /// Run the server on an already-bound listener
    ///
    /// Lets the caller bind port 0 and learn the real port before serving.
    pub async fn run_on(&self, listener: TcpListener) -> Result<()> {
        tracing::info!(addr = %listener.local_addr()?, "Chat relay listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Chat relay listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    if let Err(e) = self.handle_connection(socket, peer_addr).await {
                        tracing::error!(
                            peer = %peer_addr,
                            error = %e,
                            "Failed to set up connection"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    async fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) -> Result<()> {
        // Check connection limit; over-cap peers are dropped on the floor.
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return Ok(());
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        self.configure_socket(&socket)?;

        let (reader, writer) = socket.into_split();
        let peer = Arc::new(Peer::new(session_id, peer_addr, writer));
        self.registry.add(peer).await?;

        // Announce after registration; the sender-exclusion rule keeps the
        // new peer from seeing its own join.
        self.registry.broadcast(&Envelope::joined(peer_addr)).await;

        let connection = Connection::new(
            session_id,
            peer_addr,
            reader,
            Arc::clone(&self.registry),
            self.config.recv_buffer_size,
        );

        tokio::spawn(async move {
            // Hold the permit for the lifetime of the session, so the cap
            // counts live connections rather than accepts.
            let _permit = permit;

            connection.run().await;

            tracing::debug!(session_id = session_id, "Connection closed");
        });

        Ok(())
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }

        Ok(())
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
