//! Peer entry types
//!
//! This module defines the per-peer state stored in the registry.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Entry for a single connected peer in the registry
///
/// The registry owns the write half of the peer's stream; the matching read
/// half lives in the peer's reader task. Dropping the entry shuts down the
/// write side of the connection.
pub struct Peer {
    /// Unique session ID, for log correlation
    session_id: u64,

    /// Remote address captured at accept time
    ///
    /// This is the peer's identity everywhere: broadcast prefixes,
    /// announcements, and eviction paths all use this captured value.
    addr: SocketAddr,

    /// Write half of the peer's stream, serialized across broadcast passes
    writer: Mutex<OwnedWriteHalf>,

    /// When the peer joined the room
    joined_at: Instant,

    /// Total bytes delivered to this peer
    bytes_delivered: AtomicU64,
}

impl Peer {
    /// Create a new peer entry
    pub fn new(session_id: u64, addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            session_id,
            addr,
            writer: Mutex::new(writer),
            joined_at: Instant::now(),
            bytes_delivered: AtomicU64::new(0),
        }
    }

    /// The peer's remote address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The peer's session ID
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// When the peer joined the room
    pub fn joined_at(&self) -> Instant {
        self.joined_at
    }

    /// Total bytes delivered to this peer so far
    pub fn bytes_delivered(&self) -> u64 {
        self.bytes_delivered.load(Ordering::Relaxed)
    }

    /// Write one rendered envelope to this peer.
    ///
    /// The per-peer mutex keeps concurrent broadcast passes from
    /// interleaving bytes within a single recipient.
    pub(super) async fn send(&self, wire: &Bytes) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(wire).await?;
        self.bytes_delivered
            .fetch_add(wire.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Shut down the write half so every subsequent send fails.
    #[cfg(test)]
    pub(super) async fn break_writer(&self) {
        let _ = self.writer.lock().await.shutdown().await;
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("session_id", &self.session_id)
            .field("addr", &self.addr)
            .field("bytes_delivered", &self.bytes_delivered())
            .finish()
    }
}
