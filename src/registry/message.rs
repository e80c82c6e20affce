//! Envelope types for broadcast routing
//!
//! This module defines the events relayed to room members and their wire
//! rendering. The relay is unframed: recipients see exactly the rendered
//! bytes, with no length prefix or delimiter guarantee.

use std::net::SocketAddr;

use bytes::{BufMut, Bytes, BytesMut};

/// Kind of relayed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// A chunk of chat data read from a peer
    Chat,
    /// A peer joined the room
    Joined,
    /// A peer left the room
    Left,
}

/// An event to be broadcast to room members
///
/// The sender address is captured once, at accept time, and carried here so
/// every announcement and error path names the right peer. Cheap to clone:
/// the payload is reference-counted `Bytes`.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Kind of event
    pub kind: EnvelopeKind,
    /// Address of the originating peer (excluded from delivery)
    pub sender: SocketAddr,
    /// Raw payload (empty for join/leave announcements)
    pub payload: Bytes,
}

impl Envelope {
    /// Create a chat envelope carrying one chunk read from `sender`
    pub fn chat(sender: SocketAddr, payload: Bytes) -> Self {
        Self {
            kind: EnvelopeKind::Chat,
            sender,
            payload,
        }
    }

    /// Create a join announcement for `sender`
    pub fn joined(sender: SocketAddr) -> Self {
        Self {
            kind: EnvelopeKind::Joined,
            sender,
            payload: Bytes::new(),
        }
    }

    /// Create a leave announcement for `sender`
    pub fn left(sender: SocketAddr) -> Self {
        Self {
            kind: EnvelopeKind::Left,
            sender,
            payload: Bytes::new(),
        }
    }

    /// Render the bytes delivered to each recipient.
    ///
    /// Chat payloads are forwarded verbatim behind a `\r<host:port> `
    /// identity prefix; the leading `\r` lets line-oriented clients
    /// overwrite their local prompt. Announcements are single lines.
    pub fn to_wire(&self) -> Bytes {
        match self.kind {
            EnvelopeKind::Chat => {
                let mut buf = BytesMut::with_capacity(self.payload.len() + 32);
                buf.put_slice(format!("\r<{}> ", self.sender).as_bytes());
                buf.put_slice(&self.payload);
                buf.freeze()
            }
            EnvelopeKind::Joined => Bytes::from(format!("[{}] entered room\n", self.sender)),
            EnvelopeKind::Left => Bytes::from(format!("[{}] left room\n", self.sender)),
        }
    }
}
