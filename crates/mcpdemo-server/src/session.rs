//! MCP session state for one stdio connection.

use mcpdemo_core::logging::{info, targets};
use mcpdemo_protocol::{ClientCapabilities, ClientInfo, ServerCapabilities, ServerInfo};

/// An MCP session between client and host.
///
/// Until [`Session::initialize`] runs, only `initialize` and `ping` are
/// served.
#[derive(Debug)]
pub struct Session {
    initialized: bool,
    client_info: Option<ClientInfo>,
    client_capabilities: Option<ClientCapabilities>,
    server_info: ServerInfo,
    server_capabilities: ServerCapabilities,
    protocol_version: Option<String>,
}

impl Session {
    /// Creates a new uninitialized session.
    #[must_use]
    pub fn new(server_info: ServerInfo, server_capabilities: ServerCapabilities) -> Self {
        Self {
            initialized: false,
            client_info: None,
            client_capabilities: None,
            server_info,
            server_capabilities,
            protocol_version: None,
        }
    }

    /// Returns whether the session has been initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Records the client's handshake. A second `initialize` replaces the
    /// first.
    pub fn initialize(
        &mut self,
        client_info: ClientInfo,
        client_capabilities: ClientCapabilities,
        protocol_version: String,
    ) {
        info!(
            target: targets::SESSION,
            "Session opened by {} {}", client_info.name, client_info.version
        );
        self.client_info = Some(client_info);
        self.client_capabilities = Some(client_capabilities);
        self.protocol_version = Some(protocol_version);
        self.initialized = true;
    }

    /// Returns the client info if initialized.
    #[must_use]
    pub fn client_info(&self) -> Option<&ClientInfo> {
        self.client_info.as_ref()
    }

    /// Returns true if the client advertised the sampling capability.
    #[must_use]
    pub fn client_supports_sampling(&self) -> bool {
        self.client_capabilities
            .as_ref()
            .is_some_and(|caps| caps.sampling.is_some())
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
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }
}
