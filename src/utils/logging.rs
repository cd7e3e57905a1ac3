//! Logging utilities
//!
//! Provides logging setup and connection lifecycle log lines.

use env_logger::Env;
use log::info;
use std::net::SocketAddr;

/// Setup logging for the server
///
/// Defaults to `info`; `RUST_LOG` overrides the filter.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Log a client connection
pub fn log_connection(client_addr: &SocketAddr) {
    info!("Client connected: {}", client_addr);
}

/// Log the end of a client connection
pub fn log_disconnection(peer: &str, name: Option<&str>) {
    match name {
        Some(name) => info!("Client {} ({}) has disconnected", name, peer),
        None => info!("Client {} disconnected without joining", peer),
    }
}
