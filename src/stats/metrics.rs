//! Statistics for relay sessions

use std::time::Duration;

/// Session-level statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Total bytes received from the peer
    pub bytes_received: u64,
    /// Number of chunks read (one broadcast pass each)
    pub chunks_received: u64,
    /// Connection duration
    pub duration: Duration,
}

impl SessionStats {
    /// Create a new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Average inbound throughput in bytes per second
    pub fn throughput(&self) -> u64 {
        let secs = self.duration.as_secs();
        if secs > 0 {
            self.bytes_received / secs
        } else {
            0
        }
    }
}
