//! Configuration management for the TCP chat server
//!
//! Values are layered: built-in defaults, then an optional `config.toml`,
//! then `TCP_CHAT_*` environment variables. The command-line port, when
//! given, wins over all of them. Validation runs on the merged result.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ChatServerError;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Ports a chat server may listen on.
pub const PORT_RANGE: RangeInclusive<u16> = 8000..=9999;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8989;
pub const DEFAULT_MAX_CLIENTS: usize = 10;
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024;
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// Complete chat server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// IP address the listener binds to
    /// Environment: TCP_CHAT_BIND_ADDRESS
    pub bind_address: String,

    /// Listen port
    /// Environment: TCP_CHAT_PORT
    pub port: u16,

    /// Maximum concurrently registered clients
    /// Environment: TCP_CHAT_MAX_CLIENTS
    pub max_clients: usize,

    /// Largest accepted single client input, in bytes
    pub max_message_bytes: usize,

    /// Transcript file, truncated at startup
    pub log_file: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl ChatConfig {
    /// Load configuration from config.toml with environment overrides.
    ///
    /// `port_override` comes from the command line and replaces any
    /// configured port before validation.
    pub fn load(port_override: Option<u16>) -> Result<Self, ChatServerError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("max_clients", DEFAULT_MAX_CLIENTS as i64)?
            .set_default("max_message_bytes", DEFAULT_MAX_MESSAGE_BYTES as i64)?
            .set_default("log_file", DEFAULT_LOG_FILE)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("TCP_CHAT").try_parsing(true))
            .build()?;

        Self::resolve(settings, port_override)
    }

    fn resolve(settings: Config, port_override: Option<u16>) -> Result<Self, ChatServerError> {
        let mut config: ChatConfig = settings.try_deserialize()?;
        if let Some(port) = port_override {
            config = config.with_port(port);
        }
        config.validate()?;
        Ok(config)
    }

    /// Replace the port, e.g. with the one given on the command line
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !PORT_RANGE.contains(&self.port) {
            return Err(config::ConfigError::Message(format!(
                "port must be between {} and {}",
                PORT_RANGE.start(),
                PORT_RANGE.end()
            )));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_message_bytes == 0 {
            return Err(config::ConfigError::Message(
                "max_message_bytes must be greater than 0".into(),
            ));
        }

        if self.log_file.is_empty() {
            return Err(config::ConfigError::Message(
                "log_file cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get the transcript location as PathBuf
    pub fn log_file_path(&self) -> PathBuf {
        PathBuf::from(&self.log_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_socket(), "0.0.0.0:8989");
    }

    #[test]
    fn test_port_range_enforced() {
        assert!(ChatConfig::default().with_port(7999).validate().is_err());
        assert!(ChatConfig::default().with_port(10000).validate().is_err());
        assert!(ChatConfig::default().with_port(8000).validate().is_ok());
        assert!(ChatConfig::default().with_port(9999).validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = ChatConfig {
            max_clients: 0,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ChatConfig {
            max_message_bytes: 0,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ChatConfig {
            log_file: String::new(),
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());
    }

    fn settings_with_port(port: i64) -> Config {
        Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)
            .unwrap()
            .set_default("port", port)
            .unwrap()
            .set_default("max_clients", DEFAULT_MAX_CLIENTS as i64)
            .unwrap()
            .set_default("max_message_bytes", DEFAULT_MAX_MESSAGE_BYTES as i64)
            .unwrap()
            .set_default("log_file", DEFAULT_LOG_FILE)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_command_line_port_replaces_configured_port() {
        let config = ChatConfig::resolve(settings_with_port(80), Some(8080)).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_configured_port_validated_without_override() {
        match ChatConfig::resolve(settings_with_port(80), None) {
            Err(ChatServerError::ConfigError(msg)) => assert!(msg.contains("8000")),
            other => panic!("expected config error, got {:?}", other.map(|c| c.port)),
        }
        let config = ChatConfig::resolve(settings_with_port(9000), None).unwrap();
        assert_eq!(config.port, 9000);
    }
}
