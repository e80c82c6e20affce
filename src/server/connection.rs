//! Per-connection reader task
//!
//! Owns the read half of one peer's stream and drives broadcast and
//! eviction through the room registry. The matching write half lives in the
//! registry entry created at accept time.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;

use crate::registry::{Envelope, RoomRegistry};
use crate::stats::SessionStats;

/// Reader side of one peer connection
pub struct Connection {
    session_id: u64,

    /// Remote address captured at accept time; every announcement and error
    /// path for this peer uses this value, never a re-derived one.
    addr: SocketAddr,

    reader: OwnedReadHalf,
    registry: Arc<RoomRegistry>,
    recv_buffer_size: usize,
    stats: SessionStats,
}

impl Connection {
    /// Create a new reader for an accepted, registered peer
    pub fn new(
        session_id: u64,
        addr: SocketAddr,
        reader: OwnedReadHalf,
        registry: Arc<RoomRegistry>,
        recv_buffer_size: usize,
    ) -> Self {
        Self {
            session_id,
            addr,
            reader,
            registry,
            recv_buffer_size,
            stats: SessionStats::new(),
        }
    }

    /// Read loop for this peer.
    ///
    /// Relays every chunk read to the rest of the room. Returns once the
    /// peer closes or faults; by then the peer has been removed from the
    /// registry and its departure announced. A read fault here never
    /// propagates: it evicts this peer and nothing else.
    pub async fn run(mut self) {
        let started = Instant::now();

        loop {
            let mut buf = BytesMut::with_capacity(self.recv_buffer_size);

            match self.reader.read_buf(&mut buf).await {
                // Orderly close
                Ok(0) => {
                    tracing::debug!(
                        session_id = self.session_id,
                        peer = %self.addr,
                        "Peer closed connection"
                    );
                    break;
                }
                Ok(n) => {
                    self.stats.bytes_received += n as u64;
                    self.stats.chunks_received += 1;

                    let delivered = self
                        .registry
                        .broadcast(&Envelope::chat(self.addr, buf.freeze()))
                        .await;

                    tracing::trace!(
                        session_id = self.session_id,
                        peer = %self.addr,
                        bytes = n,
                        delivered = delivered,
                        "Relayed chunk"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = self.session_id,
                        peer = %self.addr,
                        error = %e,
                        "Peer read failed"
                    );
                    break;
                }
            }
        }

        // A failed write may already have evicted this peer; remove is a
        // no-op then, and the leave announcement still names the right peer.
        self.registry.remove(self.addr).await;
        self.registry.broadcast(&Envelope::left(self.addr)).await;

        self.stats.duration = started.elapsed();
        tracing::info!(
            session_id = self.session_id,
            peer = %self.addr,
            bytes_received = self.stats.bytes_received,
            chunks_received = self.stats.chunks_received,
            duration_secs = self.stats.duration.as_secs(),
            "Session ended"
        );
    }
}
