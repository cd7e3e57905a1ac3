use log::{error, info};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::chat::{ChatLog, ChatRoom};
use crate::client::handle_client;
use crate::config::ChatConfig;
use crate::error::ChatServerError;
use crate::utils::logging::log_connection;

pub struct Server {
    room: ChatRoom,
    listener: TcpListener,
    config: ChatConfig,
}

impl Server {
    /// Binds the listener described by `config`; broadcasts are transcribed to `log`.
    pub async fn bind(config: ChatConfig, log: Box<dyn ChatLog>) -> Result<Self, ChatServerError> {
        let socket = config.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        Ok(Self {
            room: ChatRoom::new(config.max_clients, log),
            listener,
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ChatServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared room, for inspection.
    pub fn room(&self) -> ChatRoom {
        self.room.clone()
    }

    /// Accepts connections forever, one task per connection.
    pub async fn run(self) {
        let port = self
            .listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.config.port);
        info!(
            "Server is listening on port {} (max {} clients)",
            port, self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    log_connection(&addr);
                    let room = self.room.clone();
                    let max_message_bytes = self.config.max_message_bytes;

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_client(stream, addr, room, max_message_bytes).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}
