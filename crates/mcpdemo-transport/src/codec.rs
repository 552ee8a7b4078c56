//! Message codec for framing JSON-RPC messages.
//!
//! MCP uses newline-delimited JSON (NDJSON) for message framing.

use mcpdemo_core::logging::{targets, trace};
use mcpdemo_protocol::JsonRpcMessage;

/// Default line limit: 10MB.
const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Codec for encoding/decoding JSON-RPC lines.
#[derive(Debug, Clone)]
pub struct Codec {
    /// Maximum allowed message size in bytes.
    max_message_size: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Creates a new codec with the default 10MB limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Returns the maximum allowed message size in bytes.
    #[must_use]
    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Sets the maximum allowed message size in bytes.
    pub fn set_max_message_size(&mut self, size: usize) {
        self.max_message_size = size;
    }

    /// Encodes a message as one line, newline included.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the line exceeds the limit.
    pub fn encode(&self, message: &JsonRpcMessage) -> Result<Vec<u8>, CodecError> {
        let mut bytes = serde_json::to_vec(message)?;
        if bytes.len() > self.max_message_size {
            return Err(CodecError::MessageTooLarge(bytes.len()));
        }
        trace!(target: targets::CODEC, "encoded {} bytes", bytes.len());
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Decodes one line (without its terminator) into a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is too large or is not a JSON-RPC message.
    pub fn decode_line(&self, line: &str) -> Result<JsonRpcMessage, CodecError> {
        if line.len() > self.max_message_size {
            return Err(CodecError::MessageTooLarge(line.len()));
        }
        trace!(target: targets::CODEC, "decoding {} bytes", line.len());
        Ok(serde_json::from_str(line)?)
    }
}

/// Codec error types.
#[derive(Debug)]
pub enum CodecError {
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Message too large.
    MessageTooLarge(usize),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Json(e) => write!(f, "JSON error: {e}"),
            CodecError::MessageTooLarge(size) => write!(f, "Message too large: {size} bytes"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Json(e) => Some(e),
            CodecError::MessageTooLarge(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdemo_protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};

    #[test]
    fn encode_terminates_with_single_newline() {
        let codec = Codec::new();
        let request = JsonRpcRequest::new("tools/list", None, 1i64);
        let encoded = codec.encode(&JsonRpcMessage::Request(request)).unwrap();
        assert!(encoded.ends_with(b"\n"));
        assert_eq!(encoded.iter().filter(|b| **b == b'\n').count(), 1);
    }

    #[test]
    fn decode_response_line() {
        let codec = Codec::new();
        let msg = codec
            .decode_line(r#"{"jsonrpc":"2.0","result":{"ok":true},"id":1}"#)
            .unwrap();
        match msg {
            JsonRpcMessage::Response(resp) => assert_eq!(resp.id, Some(RequestId::Number(1))),
            JsonRpcMessage::Request(_) => panic!("expected response"),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        let codec = Codec::new();
        assert!(matches!(
            codec.decode_line("not json"),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn size_limit_applies_both_ways() {
        let mut codec = Codec::new();
        codec.set_max_message_size(8);
        let response = JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({}));
        assert!(matches!(
            codec.encode(&JsonRpcMessage::Response(response)),
            Err(CodecError::MessageTooLarge(_))
        ));
        assert!(matches!(
            codec.decode_line(r#"{"jsonrpc":"2.0"}"#),
            Err(CodecError::MessageTooLarge(17))
        ));
    }
}
