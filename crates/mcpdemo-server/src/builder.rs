//! Server builder for configuring the MCP host.

use mcpdemo_protocol::{
    PromptsCapability, ResourcesCapability, ServerCapabilities, ServerInfo, ToolsCapability,
};

use crate::{PromptHandler, ResourceHandler, Router, Server, ToolHandler};

/// Builder for configuring an MCP server.
///
/// Capabilities are advertised only for the kinds that received at least
/// one handler.
pub struct ServerBuilder {
    info: ServerInfo,
    capabilities: ServerCapabilities,
    router: Router,
    instructions: Option<String>,
}

impl ServerBuilder {
    /// Creates a new server builder.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            capabilities: ServerCapabilities::default(),
            router: Router::new(),
            instructions: None,
        }
    }

    /// Registers a tool handler.
    #[must_use]
    pub fn tool<H: ToolHandler + 'static>(mut self, handler: H) -> Self {
        self.router.add_tool(handler);
        self.capabilities.tools = Some(ToolsCapability::default());
        self
    }

    /// Registers a resource handler (static or templated).
    #[must_use]
    pub fn resource<H: ResourceHandler + 'static>(mut self, handler: H) -> Self {
        self.router.add_resource(handler);
        self.capabilities.resources = Some(ResourcesCapability::default());
        self
    }

    /// Registers a prompt handler.
    #[must_use]
    pub fn prompt<H: PromptHandler + 'static>(mut self, handler: H) -> Self {
        self.router.add_prompt(handler);
        self.capabilities.prompts = Some(PromptsCapability::default());
        self
    }

    /// Sets the instructions returned from `initialize`.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            info: self.info,
            capabilities: self.capabilities,
            router: self.router,
            instructions: self.instructions,
        }
    }
}
