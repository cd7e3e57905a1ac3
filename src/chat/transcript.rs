//! Chat transcript
//!
//! Append-only sink receiving every formatted broadcast line.

use log::info;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Destination for formatted broadcast lines.
pub trait ChatLog: Send + Sync {
    /// Appends one line exactly as it was broadcast, trailing newline included.
    fn append(&mut self, line: &str) -> io::Result<()>;
}

/// Transcript backed by a file that is emptied when the server starts.
pub struct FileChatLog {
    file: File,
}

impl FileChatLog {
    /// Opens `path`, creating it if needed and truncating any previous run.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        info!("Transcript file: {}", path.display());
        Ok(Self { file })
    }
}

impl ChatLog for FileChatLog {
    fn append(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }
}
