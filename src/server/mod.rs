//! Server core functionality
//!
//! This module contains the accept loop, the bounded-retry connection
//! acceptor, and server configuration.

pub mod acceptor;
pub mod config;
pub mod core;

pub use config::ServerConfig;
pub use core::Server;
