//! Module `client`
//!
//! Defines the `Client` struct: a named participant and the write side of
//! its transport.

use std::io;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Write half of a client transport.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Write half shared between a session (prompts) and the registry (broadcasts).
///
/// Each write takes the inner lock for the whole message, so a prompt and a
/// broadcast line never interleave on the wire.
pub type SharedWriter = Arc<Mutex<BoxedWriter>>;

/// Wraps any async writer for sharing.
pub fn shared_writer<W>(writer: W) -> SharedWriter
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Writes a whole message and flushes it.
pub async fn send(writer: &SharedWriter, text: &str) -> io::Result<()> {
    let mut writer = writer.lock().await;
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await
}

/// Represents one connected, named participant.
pub struct Client {
    name: String,
    writer: SharedWriter,
}

impl Client {
    pub fn new(name: impl Into<String>, writer: SharedWriter) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }

    /// Returns the display name this client is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn writer(&self) -> &SharedWriter {
        &self.writer
    }

    /// Only the registry renames, since the name is also the map key.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
