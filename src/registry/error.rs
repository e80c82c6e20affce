//! Registry error types
//!
//! Error types for room registry operations.

use std::net::SocketAddr;

/// Error type for registry operations
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// A peer with this address is already a room member
    PeerAlreadyJoined(SocketAddr),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::PeerAlreadyJoined(addr) => {
                write!(f, "Peer already joined: {}", addr)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
