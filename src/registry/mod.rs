//! Room registry for broadcast fan-out
//!
//! The registry owns the live set of connected peers and routes every
//! relayed envelope from its sender to all other members.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<RoomRegistry>
//!                   ┌─────────────────────────┐
//!                   │ peers: HashMap<Addr,    │
//!                   │   Peer {                │
//!                   │     writer: WriteHalf,  │
//!                   │   }                     │
//!                   │ >                       │
//!                   └───────────┬─────────────┘
//!                               │
//!       ┌───────────────────────┼───────────────────────┐
//!       │                       │                       │
//!       ▼                       ▼                       ▼
//!  [Reader task]           [Reader task]           [Reader task]
//!  read_buf()              read_buf()              read_buf()
//!       │                       │                       │
//!       └──► registry.broadcast() ──► peer.send() ──► TCP
//! ```
//!
//! # Mutation discipline
//!
//! Broadcast passes iterate a snapshot of the membership and apply evictions
//! only after the pass completes, so the map is never mutated while it is
//! being walked. Removal is idempotent: a peer evicted by a failed write and
//! later removed again by its own reader task is only closed once.
//!
//! # Zero-Copy Design
//!
//! Each envelope is rendered to `bytes::Bytes` once per pass; recipients
//! share the same reference-counted allocation.

pub mod error;
pub mod message;
pub mod peer;
pub mod store;

pub use error::RegistryError;
pub use message::{Envelope, EnvelopeKind};
pub use peer::Peer;
pub use store::RoomRegistry;
