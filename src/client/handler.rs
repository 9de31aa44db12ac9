//! Client session handler
//!
//! Runs the per-connection state machine: name negotiation, then the relay
//! loop, then teardown. One tokio task per connection; the task owns the
//! read half of the socket for its whole life and gets the write half back
//! from the registry at removal, so each half is closed exactly once.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;

use crate::client::registry::SharedRegistry;
use crate::client::state::ClientId;
use crate::protocol;
use crate::server::config::ServerConfig;

/// Drives a client session from acceptance to teardown.
///
/// The client record is already registered when this is spawned; every exit
/// path below converges on the single removal at the bottom, which is safe
/// to reach even if the handshake never completed.
pub async fn handle_client(
    read_half: OwnedReadHalf,
    id: ClientId,
    addr: SocketAddr,
    registry: SharedRegistry,
    config: Arc<ServerConfig>,
) {
    let mut reader = BufReader::new(read_half);

    let name = negotiate_name(&mut reader, id, addr, &registry, &config).await;

    let graceful = match name.as_deref() {
        Some(name) => relay_loop(&mut reader, id, name, &registry, &config).await,
        None => false,
    };

    let mut clients = registry.lock().await;
    let removed = clients.remove(id);
    if graceful && removed.is_some() {
        if let Some(name) = &name {
            let announcement = protocol::leave_announcement(name);
            if let Err(e) = clients.broadcast(&announcement, id).await {
                warn!("Departure announcement for {} incomplete: {}", name, e);
            }
            info!("{} ({}) left the chat", name, addr);
        }
    }
    drop(clients);
    // Dropping `removed` closes the write half; the read half goes with `reader`.
}

/// Reads one line into `line`, buffering at most `max_bytes` plus room for
/// the line terminator. Returns the number of bytes read, 0 at end of
/// stream.
///
/// A line longer than the cap comes back split across successive calls, the
/// way a fixed-size receive buffer would split it; the session never holds
/// more than the limit in memory for one client.
async fn read_line_bounded(
    reader: &mut BufReader<OwnedReadHalf>,
    max_bytes: usize,
    line: &mut String,
) -> io::Result<usize> {
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take((max_bytes + 2) as u64)
        .read_until(b'\n', &mut buf)
        .await?;
    line.clear();
    line.push_str(&String::from_utf8_lossy(&buf));
    Ok(n)
}

/// Awaiting-name phase: reads the first line and stores it as the display
/// name, then announces the join to everyone else.
///
/// Returns `None` when the client never fully joins (disconnect, empty name,
/// read error, or a failed join announcement); no departure is broadcast for
/// such a client.
async fn negotiate_name(
    reader: &mut BufReader<OwnedReadHalf>,
    id: ClientId,
    addr: SocketAddr,
    registry: &SharedRegistry,
    config: &ServerConfig,
) -> Option<String> {
    let mut line = String::new();
    match read_line_bounded(reader, config.max_name_length, &mut line).await {
        Ok(0) => {
            info!("Client {} ({}) disconnected before joining", id, addr);
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            error!("Failed to read name from client {} ({}): {}", id, addr, e);
            return None;
        }
    }

    let name = protocol::truncate_chars(protocol::trim_line(&line), config.max_name_length);
    if name.is_empty() {
        info!("Client {} ({}) sent an empty name", id, addr);
        return None;
    }
    let name = name.to_string();

    // Name assignment and the join announcement happen under one lock
    // acquisition so no broadcast can interleave between them.
    let mut clients = registry.lock().await;
    if !clients.set_name(id, name.clone()) {
        warn!("Client {} vanished from registry during handshake", id);
        return None;
    }
    let announcement = protocol::join_announcement(&name);
    if let Err(e) = clients.broadcast(&announcement, id).await {
        error!("Join announcement for {} failed: {}", name, e);
        return None;
    }
    drop(clients);

    info!("{} ({}) joined the chat", name, addr);
    Some(name)
}

/// Active phase: relays each received line to all other members.
///
/// Returns `true` for a graceful departure (peer closed the stream or sent
/// the exit token), `false` for abnormal loss (read or broadcast failure),
/// which skips the departure announcement.
async fn relay_loop(
    reader: &mut BufReader<OwnedReadHalf>,
    id: ClientId,
    name: &str,
    registry: &SharedRegistry,
    config: &ServerConfig,
) -> bool {
    let mut line = String::new();
    loop {
        match read_line_bounded(reader, config.max_message_length, &mut line).await {
            Ok(0) => {
                info!("Connection closed by {} ({})", name, id);
                return true;
            }
            Ok(_) => {
                let text = protocol::trim_line(&line);
                if protocol::is_exit(text) {
                    info!("{} requested to leave", name);
                    return true;
                }
                let text = protocol::truncate_bytes(text, config.max_message_length);
                let message = protocol::chat_line(name, text);

                let mut clients = registry.lock().await;
                if let Err(e) = clients.broadcast(&message, id).await {
                    // The failed recipient aside, this session is treated as
                    // unhealthy: terminate it without a departure broadcast.
                    error!("Relay from {} failed: {}", name, e);
                    return false;
                }
            }
            Err(e) => {
                error!("Failed to read from {} ({}): {}", name, id, e);
                return false;
            }
        }
    }
}
