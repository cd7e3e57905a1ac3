//! Error types
//!
//! Defines domain-specific error types for the chat server.

use std::fmt;
use std::io;

/// Client registry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NameTaken(String),
    RegistryFull(usize),
    ClientNotFound(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NameTaken(name) => write!(f, "Name already in use: {}", name),
            RegistryError::RegistryFull(capacity) => {
                write!(f, "Registry is full ({} clients)", capacity)
            }
            RegistryError::ClientNotFound(name) => write!(f, "Client not found: {}", name),
        }
    }
}

impl std::error::Error for RegistryError {}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Registry(RegistryError),
    IoError(io::Error),
    ConfigError(String),
    ProtocolError(String),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Registry(e) => write!(f, "Registry error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
            ChatServerError::ConfigError(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::ProtocolError(e) => write!(f, "Protocol error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<RegistryError> for ChatServerError {
    fn from(error: RegistryError) -> Self {
        ChatServerError::Registry(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::ConfigError(error.to_string())
    }
}

impl ChatServerError {
    /// Returns true when the error means the peer went away rather than misbehaved.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ChatServerError::IoError(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
