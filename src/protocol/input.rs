//! Client input framing
//!
//! Input is newline-agnostic: whatever one read from the transport returns
//! is one logical input, whether it ends in a newline or not. The reader's
//! buffer is sized above the message limit so an overlong read is seen
//! whole and rejected instead of being split into acceptable pieces.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Minimum read buffer for a client transport.
pub const READ_BUFFER_SIZE: usize = 8 * 1024;

/// One unit of client input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// The bytes of one read, decoded, not yet trimmed.
    Data(String),
    /// The read carried more than the limit and was discarded.
    Oversize,
    /// The peer closed the stream.
    Eof,
}

/// Buffer capacity for a reader enforcing `limit`.
///
/// Leaves room for the content plus a `\r\n` terminator and one extra byte,
/// so a read can exceed the limit and be detected.
pub fn reader_capacity(limit: usize) -> usize {
    READ_BUFFER_SIZE.max(limit.saturating_add(3))
}

/// Reads the next input, allowing at most `limit` bytes of content.
///
/// A trailing line terminator does not count toward the limit.
pub async fn read_input<R>(reader: &mut R, limit: usize) -> io::Result<Input>
where
    R: AsyncBufRead + Unpin,
{
    let (input, consumed) = {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(Input::Eof);
        }

        let input = if strip_line_ending(chunk).len() > limit {
            Input::Oversize
        } else {
            Input::Data(String::from_utf8_lossy(chunk).into_owned())
        };
        (input, chunk.len())
    };

    reader.consume(consumed);
    Ok(input)
}

fn strip_line_ending(chunk: &[u8]) -> &[u8] {
    let chunk = chunk.strip_suffix(b"\n").unwrap_or(chunk);
    chunk.strip_suffix(b"\r").unwrap_or(chunk)
}
