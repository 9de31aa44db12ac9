//! Client registry
//!
//! The concurrency-safe set of currently connected clients. A single lock
//! serializes add, remove, and broadcast; broadcast holds it for the entire
//! fan-out, so one slow recipient stalls registry operations system-wide.
//! That is a deliberate simplicity-over-fairness trade-off, not a bug.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::client::state::{Client, ClientId};
use crate::error::RegistryError;

/// Registry handle shared by the server loop and every session task.
pub type SharedRegistry = Arc<Mutex<ClientRegistry>>;

/// Capacity-bounded registry of active clients, keyed by identifier.
///
/// Identifiers are monotonic, so the map's ascending-id order is also
/// insertion order; fan-out visits members in that order.
pub struct ClientRegistry {
    clients: BTreeMap<ClientId, Client>,
    capacity: usize,
}

impl ClientRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            clients: BTreeMap::new(),
            capacity,
        }
    }

    /// Inserts a client, rejecting it when the registry is full.
    ///
    /// On rejection the client record is dropped here, which closes the
    /// outbound half of its socket; the caller drops the read half.
    pub fn add(&mut self, client: Client) -> Result<(), RegistryError> {
        if self.clients.len() >= self.capacity {
            return Err(RegistryError::CapacityReached(self.capacity));
        }
        self.clients.insert(client.id(), client);
        Ok(())
    }

    /// Removes a client by identifier, returning its record (and with it
    /// the write half of its socket) when present.
    ///
    /// Idempotent: removing an absent identifier is a no-op, so a session
    /// that failed before fully joining can still run its teardown path.
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        self.clients.remove(&id)
    }

    /// Sets the display name of a registered client.
    ///
    /// Returns `false` when the client is no longer registered.
    pub fn set_name(&mut self, id: ClientId, name: String) -> bool {
        match self.clients.get_mut(&id) {
            Some(client) => {
                client.set_name(name);
                true
            }
            None => false,
        }
    }

    /// Delivers `message` to every member except `exclude_id`, in ascending
    /// id order.
    ///
    /// The first delivery failure aborts the remaining fan-out and is
    /// reported to the caller; recipients reached before the failure keep
    /// the message. There is no per-recipient retry.
    pub async fn broadcast(
        &mut self,
        message: &str,
        exclude_id: ClientId,
    ) -> Result<(), RegistryError> {
        for (id, client) in self.clients.iter_mut() {
            if *id == exclude_id {
                continue;
            }
            client
                .writer_mut()
                .write_all(message.as_bytes())
                .await
                .map_err(|e| RegistryError::BroadcastFailed {
                    id: *id,
                    source: e,
                })?;
        }
        Ok(())
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
