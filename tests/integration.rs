//! End-to-end tests over real TCP sockets.
//!
//! Each test spawns its own server on an ephemeral port, connects plain
//! `TcpStream` clients, and asserts on the exact bytes the relay produces.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use chat_relay_server::{Server, ServerConfig};

const READ_TIMEOUT: Duration = Duration::from_secs(5);

// Small pause to let the server finish processing a connection or line
// before the next client acts on its effects.
const SETTLE: Duration = Duration::from_millis(100);

async fn start_server(max_clients: usize) -> SocketAddr {
    let config = ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        max_clients,
        ..Default::default()
    };
    let server = Server::new(config).await.expect("failed to bind server");
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move {
        server.start().await;
    });
    addr
}

// Connects and sends the display name line, completing the handshake.
async fn join_chat(addr: SocketAddr, name: &str) -> BufReader<TcpStream> {
    let stream = TcpStream::connect(addr).await.expect("failed to connect");
    let mut reader = BufReader::new(stream);
    reader
        .get_mut()
        .write_all(format!("{}\n", name).as_bytes())
        .await
        .unwrap();
    sleep(SETTLE).await;
    reader
}

async fn send_line(reader: &mut BufReader<TcpStream>, line: &str) {
    reader
        .get_mut()
        .write_all(format!("{}\n", line).as_bytes())
        .await
        .unwrap();
}

// Reads exactly `expected.len()` bytes and asserts they match.
async fn expect_exact(reader: &mut BufReader<TcpStream>, expected: &str) {
    let mut buf = vec![0u8; expected.len()];
    timeout(READ_TIMEOUT, reader.read_exact(&mut buf))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {:?}", expected))
        .unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), expected);
}

// Asserts the peer closed the connection: next read yields EOF (or a reset).
async fn expect_closed(reader: &mut BufReader<TcpStream>) {
    let mut buf = [0u8; 64];
    match timeout(READ_TIMEOUT, reader.read(&mut buf)).await {
        Ok(Ok(0)) => {}
        Ok(Ok(n)) => panic!(
            "expected closed stream, got {:?}",
            String::from_utf8_lossy(&buf[..n])
        ),
        Ok(Err(_)) => {} // connection reset also counts as closed
        Err(_) => panic!("timed out waiting for stream to close"),
    }
}

#[tokio::test]
async fn test_join_relay_and_exit() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;
    let mut bob = join_chat(addr, "Bob").await;

    // Alice was already a member, so she hears Bob join.
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;

    send_line(&mut bob, "hello").await;
    expect_exact(&mut alice, "Bob> hello\n").await;

    // Relay works in the other direction too.
    send_line(&mut alice, "hi Bob").await;
    expect_exact(&mut bob, "Alice> hi Bob\n").await;

    send_line(&mut bob, "/exit").await;
    expect_exact(&mut alice, "\n=== Bob has left the chat ===\n").await;

    // The server closes Bob's stream after the graceful exit.
    expect_closed(&mut bob).await;
}

#[tokio::test]
async fn test_broadcast_reaches_all_but_sender() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;
    let mut bob = join_chat(addr, "Bob").await;
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;
    let mut carol = join_chat(addr, "Carol").await;
    expect_exact(&mut alice, "\n=== Carol has joined the chat ===\n").await;
    expect_exact(&mut bob, "\n=== Carol has joined the chat ===\n").await;

    send_line(&mut carol, "hi all").await;
    expect_exact(&mut alice, "Carol> hi all\n").await;
    expect_exact(&mut bob, "Carol> hi all\n").await;

    // Carol must not receive her own message; the next thing she sees is
    // Bob's reply.
    send_line(&mut bob, "hi Carol").await;
    expect_exact(&mut carol, "Bob> hi Carol\n").await;
}

#[tokio::test]
async fn test_capacity_rejection() {
    let addr = start_server(2).await;

    let mut alice = join_chat(addr, "Alice").await;
    let mut bob = join_chat(addr, "Bob").await;
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;

    // Third connection: closed immediately, no handshake, no announcement.
    let third = TcpStream::connect(addr).await.unwrap();
    let mut third = BufReader::new(third);
    expect_closed(&mut third).await;

    // The chat keeps working, and Bob's next bytes are Alice's message,
    // not a join announcement for the rejected connection.
    send_line(&mut alice, "still here").await;
    expect_exact(&mut bob, "Alice> still here\n").await;
}

#[tokio::test]
async fn test_abrupt_disconnect_announces_departure() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;
    let bob = join_chat(addr, "Bob").await;
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;

    // Bob's peer closes the stream without sending /exit.
    drop(bob);

    expect_exact(&mut alice, "\n=== Bob has left the chat ===\n").await;
}

#[tokio::test]
async fn test_disconnect_before_name_is_silent() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;

    // A connection that never sends a name produces no announcements.
    let ghost = TcpStream::connect(addr).await.unwrap();
    sleep(SETTLE).await;
    drop(ghost);
    sleep(SETTLE).await;

    // The next thing Alice hears is Bob joining, nothing about the ghost.
    let _bob = join_chat(addr, "Bob").await;
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;
}

#[tokio::test]
async fn test_name_trimming_tolerates_carriage_return() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;

    // A terminal-style client sending CRLF line endings.
    let stream = TcpStream::connect(addr).await.unwrap();
    let mut bob = BufReader::new(stream);
    bob.get_mut().write_all(b"Bob\r\n").await.unwrap();

    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;

    bob.get_mut().write_all(b"hello\r\n").await.unwrap();
    expect_exact(&mut alice, "Bob> hello\n").await;
}

#[tokio::test]
async fn test_exit_token_with_crlf() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;
    let mut bob = join_chat(addr, "Bob").await;
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;

    bob.get_mut().write_all(b"/exit\r\n").await.unwrap();
    expect_exact(&mut alice, "\n=== Bob has left the chat ===\n").await;
    expect_closed(&mut bob).await;
}

#[tokio::test]
async fn test_long_name_is_truncated() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;

    let long_name = "x".repeat(100);
    let _bob = join_chat(addr, &long_name).await;

    let expected = format!("\n=== {} has joined the chat ===\n", "x".repeat(64));
    expect_exact(&mut alice, &expected).await;
}

#[tokio::test]
async fn test_oversized_message_relayed_in_bounded_chunks() {
    let addr = start_server(10).await;

    let mut alice = join_chat(addr, "Alice").await;
    let mut bob = join_chat(addr, "Bob").await;
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;

    // One 5000-byte line. The server buffers at most the 4096-byte message
    // limit (plus the terminator) per read, so the line arrives split the
    // way a fixed-size receive buffer would split it: a first read of 4098
    // bytes relayed truncated to 4096, then the 902-byte remainder.
    send_line(&mut bob, &"y".repeat(5000)).await;
    expect_exact(&mut alice, &format!("Bob> {}\n", "y".repeat(4096))).await;
    expect_exact(&mut alice, &format!("Bob> {}\n", "y".repeat(902))).await;

    // The session keeps relaying normally afterwards.
    send_line(&mut bob, "done").await;
    expect_exact(&mut alice, "Bob> done\n").await;
}

#[tokio::test]
async fn test_capacity_frees_up_after_departure() {
    let addr = start_server(2).await;

    let mut alice = join_chat(addr, "Alice").await;
    let mut bob = join_chat(addr, "Bob").await;
    expect_exact(&mut alice, "\n=== Bob has joined the chat ===\n").await;

    send_line(&mut bob, "/exit").await;
    expect_exact(&mut alice, "\n=== Bob has left the chat ===\n").await;
    sleep(SETTLE).await;

    // Bob's slot is free again.
    let _carol = join_chat(addr, "Carol").await;
    expect_exact(&mut alice, "\n=== Carol has joined the chat ===\n").await;
}
