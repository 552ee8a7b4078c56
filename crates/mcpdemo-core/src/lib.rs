//! Core types for mcpdemo.
//!
//! This crate provides the fundamental building blocks shared by the
//! capability host and the capability client:
//! - [`McpContext`] carrying request-scoped identity into handlers
//! - Error types for MCP operations
//! - Structured logging targets and a stderr logger
//!
//! # Design Principles
//!
//! - Strictly synchronous: one request, one response, no runtime
//! - All types support `Send + Sync`
//! - stdout belongs to the protocol; diagnostics go to stderr

#![forbid(unsafe_code)]

mod context;
mod error;
pub mod logging;

pub use context::McpContext;
pub use error::{McpError, McpErrorCode, McpResult};
