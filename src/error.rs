//! Crate error types

use crate::registry::RegistryError;

/// Convenience result alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Top-level error type
///
/// Only listener-level faults surface here; per-peer I/O faults are consumed
/// inside the broadcast and reader paths, where they evict exactly one peer.
#[derive(Debug)]
pub enum RelayError {
    /// I/O failure (bind, listen, socket setup)
    Io(std::io::Error),
    /// Registry rejected an operation
    Registry(RegistryError),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Io(e) => write!(f, "I/O error: {}", e),
            RelayError::Registry(e) => write!(f, "Registry error: {}", e),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Io(e) => Some(e),
            RelayError::Registry(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Io(e)
    }
}

impl From<RegistryError> for RelayError {
    fn from(e: RegistryError) -> Self {
        RelayError::Registry(e)
    }
}
