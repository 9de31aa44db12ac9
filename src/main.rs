//! Chat Relay Server - Entry Point
//!
//! A TCP chat relay that fans each client's messages out to every other
//! connected client.

use std::env;
use std::process;

use log::{error, info};

use chat_relay_server::{Server, ServerConfig};

fn print_usage() {
    eprintln!("Usage: chat-relay-server [PORT]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!(
        "  {:<12}{}",
        "PORT", "Port number that the server will be listening to (1-65535)"
    );
}

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        print_usage();
        process::exit(1);
    }

    let mut config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    // An explicit port argument overrides both config file and environment.
    if let Some(arg) = args.get(1) {
        match arg.parse::<u16>() {
            Ok(port) if port > 0 => config.port = port,
            _ => {
                eprintln!("Invalid port number: {}", arg);
                print_usage();
                process::exit(1);
            }
        }
    }

    info!("Launching chat relay server...");

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            process::exit(1);
        }
    };
    server.start().await;
}
