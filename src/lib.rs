//! TCP broadcast chat relay
//!
//! A single-process chat room over plain TCP: clients connect, every chunk
//! a client sends is rebroadcast to all other members behind a
//! sender-identity prefix, joins and departures are announced to the room,
//! and members whose connections fail are evicted without disturbing anyone
//! else.
//!
//! There is no framing, persistence, or authentication: payloads are raw
//! bytes, delivery is best-effort, and consumers must tolerate arbitrary
//! chunking.
//!
//! # Quick start
//!
//! ```no_run
//! use relay_rs::{RelayServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> relay_rs::Result<()> {
//!     let config = ServerConfig::default(); // 0.0.0.0:8000
//!     let server = RelayServer::new(config);
//!     server.run().await
//! }
//! ```

pub mod error;
pub mod registry;
pub mod server;
pub mod stats;

pub use error::{RelayError, Result};
pub use registry::{Envelope, RoomRegistry};
pub use server::{RelayServer, ServerConfig};
