//! Room registry implementation
//!
//! The central registry that owns the live set of connected peers and fans
//! each relayed envelope out to every member except its sender.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::RegistryError;
use super::message::Envelope;
use super::peer::Peer;

/// Central registry for all connected peers
///
/// Shared between the accept loop and the per-connection reader tasks via
/// `Arc`. The listening socket is never a member; only accepted peers are.
pub struct RoomRegistry {
    /// Map of remote address to peer entry
    peers: RwLock<HashMap<SocketAddr, Arc<Peer>>>,
}

impl RoomRegistry {
    /// Create a new, empty registry
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a newly accepted peer.
    ///
    /// Returns an error if a peer with the same address is already a member.
    /// Accept-driven creation makes that impossible in practice, but the
    /// duplicate is surfaced rather than silently overwriting a live entry.
    pub async fn add(&self, peer: Arc<Peer>) -> Result<(), RegistryError> {
        let mut peers = self.peers.write().await;

        if peers.contains_key(&peer.addr()) {
            return Err(RegistryError::PeerAlreadyJoined(peer.addr()));
        }

        tracing::info!(
            peer = %peer.addr(),
            session_id = peer.session_id(),
            members = peers.len() + 1,
            "Peer joined room"
        );
        peers.insert(peer.addr(), peer);

        Ok(())
    }

    /// Remove a peer from the room.
    ///
    /// Idempotent: removing a non-member is a no-op and returns `false`.
    /// Dropping the last reference to the entry shuts down the peer's write
    /// half, so removal doubles as the close path and can never double-close.
    pub async fn remove(&self, addr: SocketAddr) -> bool {
        let mut peers = self.peers.write().await;

        match peers.remove(&addr) {
            Some(peer) => {
                tracing::info!(
                    peer = %addr,
                    session_id = peer.session_id(),
                    members = peers.len(),
                    "Peer removed from room"
                );
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current membership.
    ///
    /// Broadcast passes iterate the copy, so removals that land mid-pass
    /// never invalidate the iteration.
    pub async fn snapshot(&self) -> Vec<Arc<Peer>> {
        self.peers.read().await.values().cloned().collect()
    }

    /// Number of current members
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Whether the room is empty
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    /// Fan an envelope out to every member except its sender.
    ///
    /// The envelope is rendered once and the resulting `Bytes` shared across
    /// recipients. A recipient whose write fails is evicted after the pass
    /// completes; the failure never interrupts delivery to the remaining
    /// recipients, and the evicted peer is not written to again.
    ///
    /// Returns the number of successful deliveries.
    pub async fn broadcast(&self, envelope: &Envelope) -> usize {
        let recipients = self.snapshot().await;
        let wire = envelope.to_wire();

        let mut delivered = 0;
        let mut failed: Vec<SocketAddr> = Vec::new();

        for peer in recipients.iter().filter(|p| p.addr() != envelope.sender) {
            match peer.send(&wire).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        peer = %peer.addr(),
                        session_id = peer.session_id(),
                        error = %e,
                        "Evicting unwritable peer"
                    );
                    failed.push(peer.addr());
                }
            }
        }

        // Deferred: the map is only touched once the pass is over.
        for addr in failed {
            self.remove(addr).await;
        }

        delivered
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use tokio::io::AsyncReadExt;
    use tokio::net::tcp::OwnedWriteHalf;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::timeout;

    use super::*;

    /// Accept one loopback connection. Returns the server-side write half,
    /// the address the server saw, and the client end of the stream.
    async fn socket_pair() -> (OwnedWriteHalf, SocketAddr, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let connect = tokio::spawn(TcpStream::connect(addr));
        let (server, peer_addr) = listener.accept().await.unwrap();
        let client = connect.await.unwrap().unwrap();

        let (_read_half, write_half) = server.into_split();
        (write_half, peer_addr, client)
    }

    async fn peer_pair(session_id: u64) -> (Arc<Peer>, TcpStream) {
        let (write_half, peer_addr, client) = socket_pair().await;
        (Arc::new(Peer::new(session_id, peer_addr, write_half)), client)
    }

    async fn read_some(stream: &mut TcpStream) -> Vec<u8> {
        let mut buf = vec![0u8; 4096];
        let n = timeout(Duration::from_secs(2), stream.read(&mut buf))
            .await
            .expect("read timed out")
            .unwrap();
        buf.truncate(n);
        buf
    }

    async fn assert_silent(stream: &mut TcpStream) {
        let mut buf = [0u8; 64];
        let result = timeout(Duration::from_millis(200), stream.read(&mut buf)).await;
        assert!(result.is_err(), "expected no data, got {:?}", &result);
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_address() {
        let registry = RoomRegistry::new();
        let (peer, _client) = peer_pair(1).await;
        let addr = peer.addr();

        registry.add(peer).await.unwrap();

        // Same address, fresh socket.
        let (write_half, _, _dup_client) = socket_pair().await;
        let dup = Arc::new(Peer::new(2, addr, write_half));
        let result = registry.add(dup).await;

        assert!(matches!(result, Err(RegistryError::PeerAlreadyJoined(a)) if a == addr));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = RoomRegistry::new();
        let (peer, _client) = peer_pair(1).await;
        let addr = peer.addr();

        registry.add(peer).await.unwrap();

        assert!(registry.remove(addr).await);
        assert!(!registry.remove(addr).await);
        assert!(!registry.remove(addr).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        let registry = RoomRegistry::new();
        let (a, mut a_client) = peer_pair(1).await;
        let (b, mut b_client) = peer_pair(2).await;
        let a_addr = a.addr();

        registry.add(a).await.unwrap();
        registry.add(b).await.unwrap();

        let delivered = registry
            .broadcast(&Envelope::chat(a_addr, Bytes::from_static(b"hello")))
            .await;

        assert_eq!(delivered, 1);
        let received = read_some(&mut b_client).await;
        assert_eq!(received, format!("\r<{}> hello", a_addr).into_bytes());
        assert_silent(&mut a_client).await;
    }

    #[tokio::test]
    async fn test_broadcast_isolates_recipient_failure() {
        let registry = RoomRegistry::new();
        let (a, _a_client) = peer_pair(1).await;
        let (b, _b_client) = peer_pair(2).await;
        let (c, mut c_client) = peer_pair(3).await;
        let (a_addr, b_addr, c_addr) = (a.addr(), b.addr(), c.addr());

        registry.add(a).await.unwrap();
        registry.add(Arc::clone(&b)).await.unwrap();
        registry.add(c).await.unwrap();

        // Every write to b now fails.
        b.break_writer().await;

        let delivered = registry
            .broadcast(&Envelope::chat(a_addr, Bytes::from_static(b"hi")))
            .await;

        // c still got the message; b is gone, a and c remain.
        assert_eq!(delivered, 1);
        assert_eq!(read_some(&mut c_client).await, format!("\r<{}> hi", a_addr).into_bytes());
        assert_eq!(registry.len().await, 2);
        let members: Vec<_> = registry.snapshot().await.iter().map(|p| p.addr()).collect();
        assert!(members.contains(&a_addr));
        assert!(members.contains(&c_addr));
        assert!(!members.contains(&b_addr));

        // A later pass sees no stale reference to b.
        let delivered = registry
            .broadcast(&Envelope::chat(a_addr, Bytes::from_static(b"again")))
            .await;
        assert_eq!(delivered, 1);
        assert_eq!(
            read_some(&mut c_client).await,
            format!("\r<{}> again", a_addr).into_bytes()
        );
    }

    #[tokio::test]
    async fn test_join_announcement_reaches_existing_members_only() {
        let registry = RoomRegistry::new();
        let (x, mut x_client) = peer_pair(1).await;
        let (y, mut y_client) = peer_pair(2).await;
        let y_addr = y.addr();

        registry.add(x).await.unwrap();
        registry.add(y).await.unwrap();

        registry.broadcast(&Envelope::joined(y_addr)).await;

        let received = read_some(&mut x_client).await;
        assert_eq!(received, format!("[{}] entered room\n", y_addr).into_bytes());
        assert_silent(&mut y_client).await;
    }

    #[tokio::test]
    async fn test_membership_counts() {
        let registry = RoomRegistry::new();
        assert!(registry.is_empty().await);

        let (a, _a_client) = peer_pair(1).await;
        let (b, _b_client) = peer_pair(2).await;
        let b_addr = b.addr();

        registry.add(a).await.unwrap();
        registry.add(b).await.unwrap();
        assert_eq!(registry.len().await, 2);

        registry.remove(b_addr).await;
        assert_eq!(registry.len().await, 1);
    }
}
