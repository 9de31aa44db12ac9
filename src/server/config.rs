//! Configuration management for the chat relay server
//!
//! Defaults cover everything; an optional `config.toml` and a `CHAT_RELAY`
//! environment prefix override them, and an explicit CLI port argument
//! overrides both (applied in `main`).

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ChatServerError;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the listening socket
    pub bind_address: String,

    /// TCP port to listen on (1-65535)
    pub port: u16,

    /// Maximum number of simultaneously connected clients
    pub max_clients: usize,

    /// Maximum display name length in characters
    pub max_name_length: usize,

    /// Maximum chat message length in bytes
    pub max_message_length: usize,

    /// Accept attempts allowed per connection before giving up
    pub max_accept_attempts: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 13000,
            max_clients: 10,
            max_name_length: 64,
            max_message_length: 4096,
            max_accept_attempts: 5,
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional config.toml with environment overrides
    pub fn load() -> Result<Self, ChatServerError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CHAT_RELAY"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("Port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_name_length == 0 {
            return Err(config::ConfigError::Message(
                "max_name_length must be greater than 0".into(),
            ));
        }

        if self.max_message_length == 0 {
            return Err(config::ConfigError::Message(
                "max_message_length must be greater than 0".into(),
            ));
        }

        if self.max_accept_attempts == 0 {
            return Err(config::ConfigError::Message(
                "max_accept_attempts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
