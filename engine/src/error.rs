//! Error types for the client lifecycle.

use crate::{hw::ports::PortFlow, state::ClientState};
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by an audio server backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ServerError(pub String);

impl ServerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<jack::Error> for ServerError {
    fn from(err: jack::Error) -> Self {
        Self(err.to_string())
    }
}

/// Errors returned by [`AudioClientHandle`](crate::client::AudioClientHandle).
///
/// Everything except the precondition variants is fatal for the connection: the
/// caller decides whether that also ends the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Client name was empty
    #[error("Client name must not be empty")]
    InvalidClientName,

    /// Server unreachable or refused the client
    #[error("Failed to open client '{name}': {reason}")]
    Connection { name: String, reason: String },

    /// Server could not register one of the requested ports
    #[error("No more ports available, failed to register '{port}': {reason}")]
    PortExhaustion { port: String, reason: String },

    /// Server refused to start calling the process callback
    #[error("Cannot activate client: {reason}")]
    Activation { reason: String },

    /// No physical port exists in the requested direction
    #[error("No physical {0} ports")]
    NoPhysicalPorts(PortFlow),

    /// Server shut down or disconnected the client
    #[error("Server shut down the client: {reason}")]
    ServerShutdown { reason: String },

    /// Accessor used while no connection is open
    #[error("Client is not open")]
    NotOpen,

    /// Lifecycle operation called from the wrong state
    #[error("Cannot {operation} a client in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ClientState,
    },
}

impl Error {
    /// Whether the error describes an unrecoverable condition rather than a
    /// misuse of the handle.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::InvalidClientName | Self::NotOpen | Self::InvalidState { .. }
        )
    }
}
