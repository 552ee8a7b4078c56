//! Standard I/O transport for MCP.
//!
//! Works over any `Read`/`Write` pair: the host's own stdin/stdout, the
//! pipes of a spawned child, or in-memory buffers in tests.
//!
//! # Wire Format
//!
//! - Each message is serialized as a single line of JSON
//! - Lines are terminated by `\n` (a trailing `\r` is tolerated on input)
//! - Empty lines are ignored
//! - UTF-8 encoding is required

use std::io::{BufRead, BufReader, Read, Write};

use mcpdemo_core::log_transport;
use mcpdemo_protocol::JsonRpcMessage;

use crate::{Codec, CodecError, Transport, TransportError};

/// Stdio transport implementation.
pub struct StdioTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
    codec: Codec,
    line_buffer: String,
}

impl<R: Read, W: Write> StdioTransport<R, W> {
    /// Creates a new transport over the given reader and writer.
    #[must_use]
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            codec: Codec::new(),
            line_buffer: String::with_capacity(4096),
        }
    }

    /// Returns the codec used for framing.
    pub fn codec_mut(&mut self) -> &mut Codec {
        &mut self.codec
    }

    /// Reads a line from the reader, handling EOF.
    fn read_line(&mut self) -> Result<&str, TransportError> {
        self.line_buffer.clear();
        let bytes_read = self.reader.read_line(&mut self.line_buffer)?;

        if bytes_read == 0 {
            return Err(TransportError::Closed);
        }

        let line = self
            .line_buffer
            .trim_end_matches('\n')
            .trim_end_matches('\r');
        if line.len() > self.codec.max_message_size() {
            return Err(TransportError::Codec(CodecError::MessageTooLarge(
                line.len(),
            )));
        }
        Ok(line)
    }
}

impl StdioTransport<std::io::Stdin, std::io::Stdout> {
    /// Creates a transport using the process's stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdin(), std::io::stdout())
    }
}

impl<R: Read, W: Write> Transport for StdioTransport<R, W> {
    fn send(&mut self, message: &JsonRpcMessage) -> Result<(), TransportError> {
        let bytes = self.codec.encode(message)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        log_transport!("sent {} bytes", bytes.len());
        Ok(())
    }

    fn recv(&mut self) -> Result<JsonRpcMessage, TransportError> {
        loop {
            let codec = self.codec.clone();
            let line = self.read_line()?;
            if line.is_empty() {
                continue;
            }
            log_transport!("received {} bytes", line.len());
            return Ok(codec.decode_line(line)?);
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdemo_protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};
    use std::io::Cursor;

    #[test]
    fn recv_parses_request() {
        let input = b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n";
        let mut transport = StdioTransport::new(Cursor::new(input.to_vec()), Vec::new());

        match transport.recv().unwrap() {
            JsonRpcMessage::Request(req) => assert_eq!(req.method, "ping"),
            JsonRpcMessage::Response(_) => panic!("expected request"),
        }
    }

    #[test]
    fn eof_returns_closed() {
        let mut transport = StdioTransport::new(Cursor::new(Vec::new()), Vec::new());
        assert!(matches!(transport.recv(), Err(TransportError::Closed)));
    }

    #[test]
    fn skips_empty_and_crlf_lines() {
        let input = b"\n\r\n{\"jsonrpc\":\"2.0\",\"method\":\"a\",\"id\":1}\r\n\n{\"jsonrpc\":\"2.0\",\"method\":\"b\",\"id\":2}\n";
        let mut transport = StdioTransport::new(Cursor::new(input.to_vec()), Vec::new());

        let methods: Vec<String> = (0..2)
            .map(|_| match transport.recv().unwrap() {
                JsonRpcMessage::Request(req) => req.method,
                JsonRpcMessage::Response(_) => panic!("expected request"),
            })
            .collect();
        assert_eq!(methods, ["a", "b"]);
        assert!(matches!(transport.recv(), Err(TransportError::Closed)));
    }

    #[test]
    fn send_writes_one_line_per_message() {
        let mut output = Vec::new();
        {
            let mut transport = StdioTransport::new(Cursor::new(Vec::new()), &mut output);
            let request = JsonRpcRequest::new("tools/list", None, 1i64);
            transport.send(&JsonRpcMessage::Request(request)).unwrap();
            let response = JsonRpcResponse::success(RequestId::Number(2), serde_json::json!({}));
            transport.send(&JsonRpcMessage::Response(response)).unwrap();
            transport.close().unwrap();
        }
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"method\":\"tools/list\""));
        assert!(lines[1].contains("\"result\":{}"));
    }

    #[test]
    fn malformed_line_is_codec_error_and_stream_continues() {
        let input = b"{oops\n{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n";
        let mut transport = StdioTransport::new(Cursor::new(input.to_vec()), Vec::new());
        assert!(matches!(
            transport.recv(),
            Err(TransportError::Codec(CodecError::Json(_)))
        ));
        assert!(transport.recv().is_ok());
    }

    #[test]
    fn rejects_oversized_line() {
        let input = b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n";
        let mut transport = StdioTransport::new(Cursor::new(input.to_vec()), Vec::new());
        transport.codec_mut().set_max_message_size(10);
        assert!(matches!(
            transport.recv(),
            Err(TransportError::Codec(CodecError::MessageTooLarge(_)))
        ));
    }

    #[test]
    fn unicode_survives_the_wire() {
        let mut output = Vec::new();
        {
            let mut transport = StdioTransport::new(Cursor::new(Vec::new()), &mut output);
            let request = JsonRpcRequest::new(
                "resources/read",
                Some(serde_json::json!({"uri": "greeting://Zoë"})),
                1i64,
            );
            transport.send(&JsonRpcMessage::Request(request)).unwrap();
        }
        let mut transport = StdioTransport::new(Cursor::new(output), Vec::new());
        match transport.recv().unwrap() {
            JsonRpcMessage::Request(req) => {
                assert_eq!(req.params.unwrap()["uri"], "greeting://Zoë");
            }
            JsonRpcMessage::Response(_) => panic!("expected request"),
        }
    }
}
