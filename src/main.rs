//! TCP Chat Server - Entry Point
//!
//! A multi-client chat relay: clients connect over TCP, pick a unique name
//! and exchange broadcast messages.

use clap::Parser;
use log::{error, info};
use std::process;

use tcp_chat::chat::FileChatLog;
use tcp_chat::cli::Cli;
use tcp_chat::config::ChatConfig;
use tcp_chat::server::Server;
use tcp_chat::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    // Usage errors exit here, before anything is touched
    let cli = Cli::parse();

    setup_logging();
    info!("Launching chat server...");

    let config = match ChatConfig::load(cli.port) {
        Ok(config) => config,
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    };

    let log = match FileChatLog::create(config.log_file_path()) {
        Ok(log) => log,
        Err(e) => {
            error!("Error opening {}: {}", config.log_file, e);
            process::exit(1);
        }
    };

    let server = match Server::bind(config, Box::new(log)).await {
        Ok(server) => server,
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    };
    server.run().await;
}
