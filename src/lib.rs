//! Chat Relay Server
//!
//! A TCP chat relay: accepts concurrent client connections, negotiates a
//! display name for each, and fans every received line of text out to all
//! other connected clients, announcing joins and departures.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;

pub use server::{Server, ServerConfig};
