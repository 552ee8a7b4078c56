//! Transport layer for mcpdemo.
//!
//! MCP messages travel as newline-delimited JSON over a byte stream. The
//! host reads its own stdin and writes its own stdout; the client does the
//! same over the pipes of the child process it spawned. [`MemoryTransport`]
//! carries the same messages between threads of one process.
//!
//! Every operation is blocking: a call returns once a full line has been
//! written or read.

#![forbid(unsafe_code)]

mod codec;
mod memory;
mod stdio;

pub use codec::{Codec, CodecError};
pub use memory::{MemoryTransport, memory_pair};
pub use stdio::StdioTransport;

use mcpdemo_core::McpError;
use mcpdemo_protocol::JsonRpcMessage;

/// A bidirectional JSON-RPC message channel.
pub trait Transport {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the underlying write fails.
    fn send(&mut self, message: &JsonRpcMessage) -> Result<(), TransportError>;

    /// Blocks until the next message arrives.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] at end of stream, or an I/O or
    /// codec error for a broken or malformed line.
    fn recv(&mut self) -> Result<JsonRpcMessage, TransportError>;

    /// Flushes and releases the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Transport error types.
#[derive(Debug)]
pub enum TransportError {
    /// I/O error on the underlying stream.
    Io(std::io::Error),
    /// A line could not be encoded or decoded.
    Codec(CodecError),
    /// The peer closed the stream.
    Closed,
}

impl TransportError {
    /// Returns true if this error means the peer went away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            TransportError::Closed => true,
            TransportError::Io(e) => e.kind() == std::io::ErrorKind::BrokenPipe,
            TransportError::Codec(_) => false,
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Io(e) => write!(f, "I/O error: {e}"),
            TransportError::Codec(e) => write!(f, "Codec error: {e}"),
            TransportError::Closed => write!(f, "Transport closed"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
            TransportError::Codec(e) => Some(e),
            TransportError::Closed => None,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err)
    }
}

impl From<CodecError> for TransportError {
    fn from(err: CodecError) -> Self {
        TransportError::Codec(err)
    }
}

impl From<TransportError> for McpError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => McpError::internal_error("Server closed the connection"),
            TransportError::Codec(CodecError::Json(e)) => {
                McpError::parse_error(format!("Invalid JSON from peer: {e}"))
            }
            other => McpError::internal_error(other.to_string()),
        }
    }
}
