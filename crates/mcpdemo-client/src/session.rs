//! Client session state.

use mcpdemo_protocol::{ClientInfo, InitializeResult, ServerCapabilities, ServerInfo};

/// Client-side view of an initialized session.
#[derive(Debug, Clone)]
pub struct ClientSession {
    /// Client info sent during initialization.
    client_info: ClientInfo,
    /// Server info received during initialization.
    server_info: ServerInfo,
    /// Server capabilities received during initialization.
    server_capabilities: ServerCapabilities,
    /// Protocol version the server answered with.
    protocol_version: String,
    /// Instructions the server returned, if any.
    instructions: Option<String>,
}

impl ClientSession {
    /// Creates a session from the `initialize` exchange.
    #[must_use]
    pub fn new(client_info: ClientInfo, result: InitializeResult) -> Self {
        Self {
            client_info,
            server_info: result.server_info,
            server_capabilities: result.capabilities,
            protocol_version: result.protocol_version,
            instructions: result.instructions,
        }
    }

    /// Returns the client info.
    #[must_use]
    pub fn client_info(&self) -> &ClientInfo {
        &self.client_info
    }

    /// Returns the server info.
    #[must_use]
    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns the server capabilities.
    #[must_use]
    pub fn server_capabilities(&self) -> &ServerCapabilities {
        &self.server_capabilities
    }

    /// Returns the negotiated protocol version.
    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Returns the server's instructions.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
}
