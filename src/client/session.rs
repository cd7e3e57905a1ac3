//! Client session management
//!
//! One `ConnectionSession` drives one accepted connection through
//! `Connecting -> Naming -> Active -> Disconnected`. Renaming is a nested
//! loop inside `Active`. Sessions never talk to each other directly; all
//! shared state goes through the [`ChatRoom`].

use log::{debug, info};
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::chat::ChatRoom;
use crate::client::{SharedWriter, send, shared_writer};
use crate::error::{ChatServerError, RegistryError, handle_error};
use crate::protocol::responses::{
    ENTER_NAME, ENTER_NEW_NAME, INVALID_NAME, MESSAGE_LIMIT, NAME_USED, RENAME_COMMAND,
    SERVER_FULL, welcome_banner,
};
use crate::protocol::{Input, read_input, reader_capacity};
use crate::utils::is_valid_name;
use crate::utils::logging::log_disconnection;

/// Lifecycle of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Naming,
    Active,
    Disconnected,
}

/// Per-connection state machine
pub struct ConnectionSession<R> {
    reader: R,
    writer: SharedWriter,
    room: ChatRoom,
    peer: String,
    name: Option<String>,
    max_message_bytes: usize,
}

/// Handles a TCP client from admission to teardown.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    room: ChatRoom,
    max_message_bytes: usize,
) {
    let (read_half, write_half) = stream.into_split();
    let session = ConnectionSession::new(
        BufReader::with_capacity(reader_capacity(max_message_bytes), read_half),
        shared_writer(write_half),
        room,
        client_addr.to_string(),
        max_message_bytes,
    );
    session.run().await;
}

impl<R> ConnectionSession<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(
        reader: R,
        writer: SharedWriter,
        room: ChatRoom,
        peer: impl Into<String>,
        max_message_bytes: usize,
    ) -> Self {
        Self {
            reader,
            writer,
            room,
            peer: peer.into(),
            name: None,
            max_message_bytes,
        }
    }

    /// Runs the session until the transport closes or fails.
    pub async fn run(mut self) {
        let mut state = SessionState::Connecting;

        loop {
            let next = match state {
                SessionState::Connecting => self.connect().await,
                SessionState::Naming => self.negotiate_name().await,
                SessionState::Active => self.relay().await,
                SessionState::Disconnected => {
                    self.disconnect().await;
                    return;
                }
            };

            state = match next {
                Ok(next) => next,
                Err(e) => {
                    handle_error(&format!("Session {}", self.peer), &e);
                    SessionState::Disconnected
                }
            };
            debug!("Session {} -> {:?}", self.peer, state);
        }
    }

    /// Admission: refuse when the room is full, otherwise greet and prompt.
    async fn connect(&mut self) -> Result<SessionState, ChatServerError> {
        if self.room.is_full().await {
            info!("Rejecting {}: server is full", self.peer);
            send(&self.writer, SERVER_FULL).await?;
            return Ok(SessionState::Disconnected);
        }

        send(&self.writer, &welcome_banner()).await?;
        send(&self.writer, ENTER_NAME).await?;
        Ok(SessionState::Naming)
    }

    /// Prompts until a valid, free name is registered. No retry limit.
    async fn negotiate_name(&mut self) -> Result<SessionState, ChatServerError> {
        loop {
            let line = match read_input(&mut self.reader, self.max_message_bytes).await? {
                Input::Eof => return Ok(SessionState::Disconnected),
                Input::Oversize => {
                    send(&self.writer, INVALID_NAME).await?;
                    continue;
                }
                Input::Data(line) => line,
            };

            let name = line.trim();
            if !is_valid_name(name) {
                send(&self.writer, INVALID_NAME).await?;
                continue;
            }

            match self.room.join(name, self.writer.clone()).await {
                Ok(_) => {
                    self.name = Some(name.to_string());
                    return Ok(SessionState::Active);
                }
                Err(RegistryError::NameTaken(_)) => {
                    send(&self.writer, NAME_USED).await?;
                }
                Err(RegistryError::RegistryFull(_)) => {
                    // the room filled up while this client was choosing a name
                    info!("Rejecting {}: server is full", self.peer);
                    send(&self.writer, SERVER_FULL).await?;
                    return Ok(SessionState::Disconnected);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Relays messages until the client goes away.
    async fn relay(&mut self) -> Result<SessionState, ChatServerError> {
        loop {
            let line = match read_input(&mut self.reader, self.max_message_bytes).await? {
                Input::Eof => return Ok(SessionState::Disconnected),
                Input::Oversize => {
                    send(&self.writer, MESSAGE_LIMIT).await?;
                    continue;
                }
                Input::Data(line) => line,
            };

            let text = line.trim();
            if text == RENAME_COMMAND {
                if self.rename().await? == SessionState::Disconnected {
                    return Ok(SessionState::Disconnected);
                }
                continue;
            }
            if text.is_empty() {
                continue;
            }

            let name = self.current_name()?.to_string();
            self.room.broadcast(Some(&name), text).await;
        }
    }

    /// Rename sub-protocol. A transport failure here ends the whole session.
    async fn rename(&mut self) -> Result<SessionState, ChatServerError> {
        let old_name = self.current_name()?.to_string();
        send(&self.writer, ENTER_NEW_NAME).await?;

        loop {
            let line = match read_input(&mut self.reader, self.max_message_bytes).await? {
                Input::Eof => return Ok(SessionState::Disconnected),
                Input::Oversize => {
                    send(&self.writer, INVALID_NAME).await?;
                    continue;
                }
                Input::Data(line) => line,
            };

            let new_name = line.trim();
            if !is_valid_name(new_name) {
                send(&self.writer, INVALID_NAME).await?;
                continue;
            }

            match self.room.rename(&old_name, new_name).await {
                Ok(_) => {
                    self.name = Some(new_name.to_string());
                    return Ok(SessionState::Active);
                }
                Err(RegistryError::NameTaken(_)) => {
                    send(&self.writer, NAME_USED).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Terminal state: deregister, announce if joined, close the transport.
    async fn disconnect(&mut self) {
        let name = self.name.take();
        if let Some(name) = &name {
            self.room.leave(name).await;
        }
        log_disconnection(&self.peer, name.as_deref());

        let _ = self.writer.lock().await.shutdown().await;
    }

    fn current_name(&self) -> Result<&str, ChatServerError> {
        self.name
            .as_deref()
            .ok_or_else(|| ChatServerError::ProtocolError("session has no name".into()))
    }
}
