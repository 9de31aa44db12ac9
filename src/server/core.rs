//! Server core
//!
//! Binds the listening socket, then loops forever: accept a connection via
//! the bounded-retry acceptor, register the client (rejecting at capacity),
//! and spawn an independent session task per registered client.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::client::handle_client;
use crate::client::registry::{ClientRegistry, SharedRegistry};
use crate::client::state::Client;
use crate::error::{AcceptError, ChatServerError};
use crate::server::acceptor::{accept_client, next_client_id};
use crate::server::config::ServerConfig;

pub struct Server {
    registry: SharedRegistry,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listening socket and builds the shared registry.
    ///
    /// A bind failure is a startup error; once `start` is running, no error
    /// terminates the process.
    pub async fn new(config: ServerConfig) -> Result<Self, ChatServerError> {
        let addr = config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            registry: Arc::new(Mutex::new(ClientRegistry::new(config.max_clients))),
            listener,
            config: Arc::new(config),
        })
    }

    /// Returns the bound address (useful when listening on port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop. Never returns; termination is process-level only.
    pub async fn start(&self) {
        info!(
            "Starting chat relay server on {} (max {} clients)",
            self.config.socket_addr(),
            self.config.max_clients
        );

        loop {
            let (stream, addr) =
                match accept_client(&self.listener, self.config.max_accept_attempts).await {
                    Ok(conn) => conn,
                    Err(e @ AcceptError::AttemptsExhausted(_)) => {
                        warn!("{}", e);
                        continue;
                    }
                    Err(e) => {
                        error!("{}", e);
                        continue;
                    }
                };

            let id = next_client_id();
            let (read_half, write_half) = stream.into_split();
            let client = Client::new(id, addr, write_half);

            {
                let mut clients = self.registry.lock().await;
                if let Err(e) = clients.add(client) {
                    // Rejected at capacity: the write half was dropped inside
                    // the registry, the read half drops here, closing the
                    // socket. No session, no announcement.
                    warn!("Rejecting connection from {}: {}", addr, e);
                    continue;
                }
                info!(
                    "Accepted client {} from {} ({}/{} clients)",
                    id,
                    addr,
                    clients.len(),
                    clients.capacity()
                );
            }

            let registry = Arc::clone(&self.registry);
            let config = Arc::clone(&self.config);

            // Spawn a task per client so the accept loop never blocks on a session
            tokio::spawn(async move {
                handle_client(read_half, id, addr, registry, config).await;
            });
        }
    }
}
