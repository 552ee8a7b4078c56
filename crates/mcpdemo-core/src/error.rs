//! Error types for MCP operations.
//!
//! [`McpError`] mirrors the JSON-RPC error object: a numeric code, a
//! human-readable message and optional structured data. It is the error
//! type returned by handlers, the router and the client.

use serde::{Deserialize, Serialize};

/// Result alias used throughout mcpdemo.
pub type McpResult<T> = Result<T, McpError>;

/// JSON-RPC and MCP error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON sent is not a valid request (also: request before `initialize`).
    InvalidRequest,
    /// The method does not exist.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal error.
    InternalError,
    /// A tool handler failed.
    ToolExecutionError,
    /// No resource matches the requested URI.
    ResourceNotFound,
    /// No prompt is registered under the requested name.
    PromptNotFound,
    /// The client handle has no live session.
    NotConnected,
    /// Any other code received over the wire.
    Custom(i32),
}

impl From<McpErrorCode> for i32 {
    fn from(code: McpErrorCode) -> Self {
        match code {
            McpErrorCode::ParseError => -32700,
            McpErrorCode::InvalidRequest => -32600,
            McpErrorCode::MethodNotFound => -32601,
            McpErrorCode::InvalidParams => -32602,
            McpErrorCode::InternalError => -32603,
            McpErrorCode::ToolExecutionError => -32000,
            McpErrorCode::ResourceNotFound => -32002,
            McpErrorCode::PromptNotFound => -32003,
            McpErrorCode::NotConnected => -32004,
            McpErrorCode::Custom(code) => code,
        }
    }
}

impl From<i32> for McpErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => McpErrorCode::ParseError,
            -32600 => McpErrorCode::InvalidRequest,
            -32601 => McpErrorCode::MethodNotFound,
            -32602 => McpErrorCode::InvalidParams,
            -32603 => McpErrorCode::InternalError,
            -32000 => McpErrorCode::ToolExecutionError,
            -32002 => McpErrorCode::ResourceNotFound,
            -32003 => McpErrorCode::PromptNotFound,
            -32004 => McpErrorCode::NotConnected,
            other => McpErrorCode::Custom(other),
        }
    }
}

impl Serialize for McpErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32((*self).into())
    }
}

impl<'de> Deserialize<'de> for McpErrorCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(McpErrorCode::from)
    }
}

/// An MCP error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpError {
    /// Error code.
    pub code: McpErrorCode,
    /// Error message.
    pub message: String,
    /// Additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl McpError {
    /// Creates a new error with the given code and message.
    #[must_use]
    pub fn new(code: McpErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data to the error.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Invalid JSON was received.
    #[must_use]
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::ParseError, message)
    }

    /// The request is not valid in the current state.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidRequest, message)
    }

    /// The method (or named capability) does not exist.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            McpErrorCode::MethodNotFound,
            format!("Method not found: {method}"),
        )
    }

    /// The parameters are invalid.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidParams, message)
    }

    /// Internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InternalError, message)
    }

    /// A tool handler failed.
    #[must_use]
    pub fn tool_error(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::ToolExecutionError, message)
    }

    /// No resource matches `uri`.
    #[must_use]
    pub fn resource_not_found(uri: &str) -> Self {
        Self::new(
            McpErrorCode::ResourceNotFound,
            format!("Resource not found: {uri}"),
        )
    }

    /// No prompt named `name`.
    #[must_use]
    pub fn prompt_not_found(name: &str) -> Self {
        Self::new(
            McpErrorCode::PromptNotFound,
            format!("Prompt not found: {name}"),
        )
    }

    /// The client handle is closed or was never connected.
    #[must_use]
    pub fn not_connected() -> Self {
        Self::new(McpErrorCode::NotConnected, "Not connected to MCP server")
    }
}

impl std::fmt::Display for McpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for McpError {}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_error(format!("JSON error: {err}"))
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        Self::internal_error(format!("I/O error: {err}"))
    }
}
