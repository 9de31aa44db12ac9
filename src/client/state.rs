//! Client state
//!
//! Defines the `Client` struct representing one connected chat participant:
//! its identifier, display name, peer address, and the outbound half of its
//! socket.

use std::net::SocketAddr;

use tokio::net::tcp::OwnedWriteHalf;

/// Identifier for a connected client.
///
/// Allocated from a process-wide monotonic counter at accept time and never
/// reused for the lifetime of the process.
pub type ClientId = u64;

/// State of a connected chat client.
///
/// The session task keeps the read half of the socket for its entire life;
/// the write half lives here, inside the registry, for the duration of
/// membership and is handed back to the session on removal. Each half is
/// therefore dropped exactly once.
pub struct Client {
    id: ClientId,
    name: String,
    addr: SocketAddr,
    writer: OwnedWriteHalf,
}

impl Client {
    /// Creates a client record with an empty display name.
    ///
    /// The name is populated by the session during the handshake phase.
    pub fn new(id: ClientId, addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            id,
            name: String::new(),
            addr,
            writer,
        }
    }

    /// Returns the client's identifier.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the client's display name (empty until the handshake completes).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the client's peer socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sets the display name negotiated during the handshake.
    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Returns the outbound half of the client's socket for broadcast writes.
    pub fn writer_mut(&mut self) -> &mut OwnedWriteHalf {
        &mut self.writer
    }
}
