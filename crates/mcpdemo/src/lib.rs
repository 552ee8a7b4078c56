//! mcpdemo: a small MCP host and client pair.
//!
//! The host exposes:
//! - Tools: `add` and the `ancient_latin_text` mangler
//! - Resources: the `gods://` table plus `ancientlatin://{text}` and
//!   `greeting://{name}` templates
//! - Prompts: `mcp_expert`, `code_review` and `git_commit`
//!
//! The client side drives the host over stdio and forwards rendered prompts
//! to an Ollama backend through [`OllamaClient`].
//!
//! # Quick Start
//!
//! ```ignore
//! use mcpdemo::prelude::*;
//!
//! // In the host binary:
//! build_server().run_stdio();
//!
//! // In the client:
//! let mut demo = DemoClient::connect(Path::new("./mcpdemo-server"), OllamaClient::default())?;
//! println!("{}", demo.greeting("World")?);
//! ```

#![forbid(unsafe_code)]

pub mod bridge;
pub mod demo_client;
pub mod gods;
pub mod latin;
pub mod names;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;

pub use bridge::OllamaClient;
pub use demo_client::{CapabilityReport, DemoClient, detect_topic};
pub use gods::GreekGod;
pub use latin::{Mangler, RandomSource, ScriptedRandom, ancient_latin_text};
pub use names::{PromptName, ResourceName, ToolName};
pub use server::{SERVER_NAME, build_server, build_server_with};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bridge::OllamaClient;
    pub use crate::demo_client::DemoClient;
    pub use crate::names::{PromptName, ResourceName, ToolName};
    pub use crate::server::build_server;
    pub use mcpdemo_core::{McpError, McpErrorCode, McpResult};
    pub use std::path::Path;
}
