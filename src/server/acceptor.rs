//! Connection acceptor
//!
//! Bounded-retry accept over the listening socket, plus allocation of
//! process-wide monotonic client identifiers. Transient network conditions
//! are retried within a fixed attempt budget; anything else aborts the
//! attempt immediately and is left to the server loop to log.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;
use tokio::net::{TcpListener, TcpStream};

use crate::client::state::ClientId;
use crate::error::AcceptError;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Hands out the next client identifier.
///
/// Monotonic for the process lifetime; identifiers are never reused.
pub fn next_client_id() -> ClientId {
    NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Accepts the next inbound connection, retrying transient network errors.
///
/// Up to `max_attempts` accepts are tried. Transient conditions (the
/// network-down / host-unreachable / protocol-negotiation class) are logged
/// and retried; any other error is surfaced at once as `Fatal`. An exhausted
/// budget yields `AttemptsExhausted`, which callers treat as non-fatal.
pub async fn accept_client(
    listener: &TcpListener,
    max_attempts: usize,
) -> Result<(TcpStream, SocketAddr), AcceptError> {
    for attempt in 1..=max_attempts {
        match listener.accept().await {
            Ok(conn) => return Ok(conn),
            Err(e) if is_transient(&e) => {
                warn!(
                    "Transient network error on accept: {} (attempt {}/{})",
                    e, attempt, max_attempts
                );
            }
            Err(e) => return Err(AcceptError::Fatal(e)),
        }
    }
    Err(AcceptError::AttemptsExhausted(max_attempts))
}

/// Retry-eligible accept failures.
///
/// Covers the classic ENETDOWN / EPROTO / ENOPROTOOPT / EHOSTDOWN / ENONET /
/// EHOSTUNREACH / EOPNOTSUPP / ENETUNREACH set, which the kernel can report
/// for a connection that died while sitting in the accept queue.
fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::NetworkDown
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::Unsupported
    )
}
