//! Error types
//!
//! Defines domain-specific error types for each module of the chat relay
//! server. No error here is permitted to take the server process down:
//! accept failures are logged by the server loop, registry and session
//! failures terminate at most the one session that hit them.

use std::fmt;
use std::io;

use crate::client::ClientId;

/// Connection acceptor errors
#[derive(Debug)]
pub enum AcceptError {
    /// The retry budget was spent on transient network errors without a
    /// single successful accept. Non-fatal: the server loop logs and keeps
    /// accepting.
    AttemptsExhausted(usize),
    /// A non-transient accept failure, surfaced without retry.
    Fatal(io::Error),
}

impl fmt::Display for AcceptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptError::AttemptsExhausted(attempts) => {
                write!(f, "Connection accept failed after {} attempts", attempts)
            }
            AcceptError::Fatal(e) => write!(f, "Failed to accept connection: {}", e),
        }
    }
}

impl std::error::Error for AcceptError {}

/// Client registry errors
#[derive(Debug)]
pub enum RegistryError {
    /// The registry already holds the configured maximum number of clients.
    CapacityReached(usize),
    /// Delivery to one recipient failed; the remaining fan-out for that
    /// broadcast was abandoned.
    BroadcastFailed { id: ClientId, source: io::Error },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::CapacityReached(capacity) => {
                write!(f, "Registry at capacity ({} clients)", capacity)
            }
            RegistryError::BroadcastFailed { id, source } => {
                write!(f, "Failed to deliver to client {}: {}", id, source)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Startup errors surfaced to `main`.
///
/// Accept and registry failures never reach this level: the server loop and
/// the sessions log and absorb them where they happen.
#[derive(Debug)]
pub enum ChatServerError {
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}
