//! MCP protocol types and JSON-RPC implementation.
//!
//! This crate provides:
//! - JSON-RPC 2.0 message types
//! - MCP method types (initialize, tools, resources, prompts, sampling)
//! - A small JSON Schema validator for tool arguments
//!
//! # Wire Format
//!
//! All messages are newline-delimited JSON (NDJSON).

#![forbid(unsafe_code)]

mod jsonrpc;
mod messages;
pub mod schema;
mod types;

pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, RequestId,
};
pub use messages::*;
pub use schema::{ValidationError, ValidationResult, validate};
pub use types::*;
