//! Command line arguments

use clap::Parser;

use crate::config::PORT_RANGE;

/// Multi-client TCP chat relay
#[derive(Parser, Debug)]
#[command(name = "tcp-chat", version, about, override_usage = "tcp-chat [port]")]
pub struct Cli {
    /// Port to listen on (8000-9999, default 8989)
    #[arg(value_parser = parse_port)]
    pub port: Option<u16>,
}

fn parse_port(raw: &str) -> Result<u16, String> {
    let port: u16 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a valid port number", raw))?;
    if PORT_RANGE.contains(&port) {
        Ok(port)
    } else {
        Err(format!(
            "port must be between {} and {}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}
