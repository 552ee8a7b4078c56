//! MCP client implementation for mcpdemo.
//!
//! A [`Client`] is an explicit connection handle: it spawns the host as a
//! child process, performs the `initialize` handshake and then issues one
//! blocking request at a time. Every call first checks that the handle is
//! still connected and fails with "Not connected to MCP server" otherwise.
//!
//! While waiting for a response the client also answers requests the host
//! sends its way: `ping`, and `sampling/createMessage` through the
//! configured [`SamplingHandler`].
//!
//! # Example
//!
//! ```ignore
//! use mcpdemo_client::Client;
//!
//! let mut client = Client::stdio("./mcpdemo-server", &[])?;
//! let tools = client.list_tools()?;
//! client.close();
//! ```

#![forbid(unsafe_code)]

mod session;

pub use session::ClientSession;

use std::collections::HashMap;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use mcpdemo_core::logging::{debug, info, targets, warn};
use mcpdemo_core::{McpError, McpResult};
use mcpdemo_protocol::{
    CallToolResult, ClientCapabilities, ClientInfo, Content, CreateMessageParams,
    CreateMessageResult, GetPromptResult, InitializeParams, InitializeResult, JsonRpcMessage,
    JsonRpcRequest, JsonRpcResponse, ListPromptsResult, ListResourceTemplatesResult,
    ListResourcesResult, ListToolsResult, PROTOCOL_VERSION, Prompt, ReadResourceResult,
    RequestId, Resource, ResourceContent, ResourceTemplate, SamplingCapability,
    ServerCapabilities, ServerInfo, Tool,
};
use mcpdemo_transport::{StdioTransport, Transport, TransportError};
use serde::de::DeserializeOwned;

/// Transport used when the host runs as a child process.
pub type ChildTransport = StdioTransport<ChildStdout, ChildStdin>;

/// Answers `sampling/createMessage` requests from the host.
pub type SamplingHandler = Box<dyn Fn(&CreateMessageParams) -> CreateMessageResult + Send>;

/// Text returned by the default sampling handler.
pub const DEFAULT_SAMPLING_TEXT: &str = "Sample response from MCP client";

/// Model name reported by the default sampling handler.
pub const DEFAULT_SAMPLING_MODEL: &str = "sample-model";

fn default_sampling_handler() -> SamplingHandler {
    Box::new(|_params| CreateMessageResult::text(DEFAULT_SAMPLING_TEXT, DEFAULT_SAMPLING_MODEL))
}

/// Builder for configuring and connecting a [`Client`].
pub struct ClientBuilder {
    client_info: ClientInfo,
    sampling: SamplingHandler,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a builder with the crate's name and version as client info.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client_info: ClientInfo {
                name: "mcpdemo-client".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            sampling: default_sampling_handler(),
        }
    }

    /// Sets the client name sent during `initialize`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.client_info.name = name.into();
        self
    }

    /// Sets the client version sent during `initialize`.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.client_info.version = version.into();
        self
    }

    /// Replaces the handler used for `sampling/createMessage`.
    #[must_use]
    pub fn sampling_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CreateMessageParams) -> CreateMessageResult + Send + 'static,
    {
        self.sampling = Box::new(handler);
        self
    }

    /// Spawns `command` with `args` and connects over its stdio.
    ///
    /// The child inherits stderr so its log lines stay visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or the handshake
    /// fails.
    pub fn connect_stdio(self, command: &str, args: &[&str]) -> McpResult<Client> {
        info!(target: targets::TRANSPORT, "Spawning MCP server: {} {:?}", command, args);
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| McpError::internal_error(format!("Failed to spawn {command}: {e}")))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(McpError::internal_error("Child process has no stdio pipes"));
        };

        let mut client = self.connect_transport(StdioTransport::new(stdout, stdin));
        client.child = Some(child);
        match client.initialize() {
            Ok(()) => Ok(client),
            Err(e) => {
                client.close();
                Err(e)
            }
        }
    }

    /// Wraps an already-open transport without performing the handshake.
    ///
    /// Call [`Client::initialize`] before anything else.
    pub fn connect_transport<T: Transport>(self, transport: T) -> Client<T> {
        Client {
            transport: Some(transport),
            session: None,
            child: None,
            client_info: self.client_info,
            sampling: self.sampling,
            next_id: 1,
        }
    }
}

/// An explicit MCP connection handle.
pub struct Client<T: Transport = ChildTransport> {
    /// `None` once the handle has been closed.
    transport: Option<T>,
    /// Set by a successful `initialize`.
    session: Option<ClientSession>,
    child: Option<Child>,
    client_info: ClientInfo,
    sampling: SamplingHandler,
    next_id: i64,
}

impl Client {
    /// Spawns `command` and connects with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or the handshake
    /// fails.
    pub fn stdio(command: &str, args: &[&str]) -> McpResult<Self> {
        ClientBuilder::new().connect_stdio(command, args)
    }
}

impl<T: Transport> Client<T> {
    /// Performs the `initialize` handshake and sends
    /// `notifications/initialized`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the server rejects the
    /// handshake.
    pub fn initialize(&mut self) -> McpResult<()> {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ClientCapabilities {
                sampling: Some(SamplingCapability {}),
            },
            client_info: self.client_info.clone(),
        };
        let result: InitializeResult = self.request("initialize", serde_json::to_value(params)?)?;
        info!(
            target: targets::SESSION,
            "Connected to {} {} (protocol {})",
            result.server_info.name,
            result.server_info.version,
            result.protocol_version
        );
        self.session = Some(ClientSession::new(self.client_info.clone(), result));
        self.notify("notifications/initialized")
    }

    /// Returns true while the handle is open and initialized.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_some() && self.session.is_some()
    }

    fn session(&self) -> McpResult<&ClientSession> {
        match (&self.transport, &self.session) {
            (Some(_), Some(session)) => Ok(session),
            _ => Err(McpError::not_connected()),
        }
    }

    /// Returns the server info from the handshake.
    ///
    /// # Errors
    ///
    /// Returns a not-connected error if the handle is closed.
    pub fn server_info(&self) -> McpResult<&ServerInfo> {
        Ok(self.session()?.server_info())
    }

    /// Returns the capabilities the server advertised.
    ///
    /// # Errors
    ///
    /// Returns a not-connected error if the handle is closed.
    pub fn server_capabilities(&self) -> McpResult<&ServerCapabilities> {
        Ok(self.session()?.server_capabilities())
    }

    /// Returns the protocol version the server answered with.
    ///
    /// # Errors
    ///
    /// Returns a not-connected error if the handle is closed.
    pub fn protocol_version(&self) -> McpResult<&str> {
        Ok(self.session()?.protocol_version())
    }

    /// Returns the server's instructions, if it sent any.
    ///
    /// # Errors
    ///
    /// Returns a not-connected error if the handle is closed.
    pub fn instructions(&self) -> McpResult<Option<&str>> {
        Ok(self.session()?.instructions())
    }

    /// Lists the server's tools.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the request fails.
    pub fn list_tools(&mut self) -> McpResult<Vec<Tool>> {
        self.session()?;
        let result: ListToolsResult = self.request("tools/list", serde_json::json!({}))?;
        Ok(result.tools)
    }

    /// Lists the server's static resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the request fails.
    pub fn list_resources(&mut self) -> McpResult<Vec<Resource>> {
        self.session()?;
        let result: ListResourcesResult = self.request("resources/list", serde_json::json!({}))?;
        Ok(result.resources)
    }

    /// Lists the server's resource templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the request fails.
    pub fn list_resource_templates(&mut self) -> McpResult<Vec<ResourceTemplate>> {
        self.session()?;
        let result: ListResourceTemplatesResult =
            self.request("resources/templates/list", serde_json::json!({}))?;
        Ok(result.resource_templates)
    }

    /// Lists the server's prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the request fails.
    pub fn list_prompts(&mut self) -> McpResult<Vec<Prompt>> {
        self.session()?;
        let result: ListPromptsResult = self.request("prompts/list", serde_json::json!({}))?;
        Ok(result.prompts)
    }

    /// Calls a tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed, the request fails, or the
    /// tool reports `isError` (surfaced as a tool-execution error carrying
    /// the tool's text).
    pub fn call_tool(&mut self, name: &str, arguments: serde_json::Value) -> McpResult<Vec<Content>> {
        self.session()?;
        let result: CallToolResult = self.request(
            "tools/call",
            serde_json::json!({"name": name, "arguments": arguments}),
        )?;
        if result.is_error {
            return Err(McpError::tool_error(result.text()));
        }
        Ok(result.content)
    }

    /// Reads a resource by URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the request fails.
    pub fn read_resource(&mut self, uri: &str) -> McpResult<Vec<ResourceContent>> {
        self.session()?;
        let result: ReadResourceResult =
            self.request("resources/read", serde_json::json!({"uri": uri}))?;
        Ok(result.contents)
    }

    /// Renders a prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the request fails.
    pub fn get_prompt(
        &mut self,
        name: &str,
        arguments: HashMap<String, String>,
    ) -> McpResult<GetPromptResult> {
        self.session()?;
        self.request(
            "prompts/get",
            serde_json::json!({"name": name, "arguments": arguments}),
        )
    }

    /// Pings the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is closed or the server does not answer.
    pub fn ping(&mut self) -> McpResult<()> {
        self.session()?;
        let _: serde_json::Value = self.request("ping", serde_json::json!({}))?;
        Ok(())
    }

    /// Closes the connection and reaps the child process, if any.
    ///
    /// Idempotent; every later call fails with a not-connected error.
    pub fn close(&mut self) {
        self.session = None;
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                debug!(target: targets::TRANSPORT, "Close failed: {}", e);
            }
            // Dropping the transport closes the child's stdin, which ends
            // its serve loop.
        }
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) => debug!(target: targets::TRANSPORT, "Server exited: {}", status),
                Err(e) => warn!(target: targets::TRANSPORT, "Failed to reap server: {}", e),
            }
        }
    }

    fn notify(&mut self, method: &str) -> McpResult<()> {
        let transport = self.transport.as_mut().ok_or_else(McpError::not_connected)?;
        transport.send(&JsonRpcMessage::Request(JsonRpcRequest::notification(
            method, None,
        )))?;
        Ok(())
    }

    /// Sends a request and blocks for its response, answering any requests
    /// the server interleaves.
    fn request<R: DeserializeOwned>(
        &mut self,
        method: &str,
        params: serde_json::Value,
    ) -> McpResult<R> {
        let transport = self.transport.as_mut().ok_or_else(McpError::not_connected)?;
        let id = self.next_id;
        self.next_id += 1;

        debug!(target: targets::SESSION, "-> {} (id {})", method, id);
        match exchange(transport, &self.sampling, JsonRpcRequest::new(method, Some(params), id)) {
            Ok(value) => {
                serde_json::from_value(value).map_err(|e| {
                    McpError::internal_error(format!("Invalid {method} result: {e}"))
                })
            }
            Err(Exchange::Rpc(e)) => Err(e),
            Err(Exchange::Transport(e)) => {
                if e.is_closed() {
                    warn!(target: targets::TRANSPORT, "Server went away during {}", method);
                    self.close();
                }
                Err(e.into())
            }
        }
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        self.close();
    }
}

enum Exchange {
    Rpc(McpError),
    Transport(TransportError),
}

impl From<TransportError> for Exchange {
    fn from(err: TransportError) -> Self {
        Exchange::Transport(err)
    }
}

fn exchange<T: Transport>(
    transport: &mut T,
    sampling: &SamplingHandler,
    request: JsonRpcRequest,
) -> Result<serde_json::Value, Exchange> {
    let expected = request.id.clone();
    transport.send(&JsonRpcMessage::Request(request))?;

    loop {
        match transport.recv()? {
            JsonRpcMessage::Response(response) if response.id == expected => {
                return response.into_result().map_err(Exchange::Rpc);
            }
            JsonRpcMessage::Response(response) => {
                debug!(target: targets::SESSION, "Ignoring stray response {:?}", response.id);
            }
            JsonRpcMessage::Request(request) => {
                if let Some(reply) = answer_server_request(sampling, request) {
                    transport.send(&JsonRpcMessage::Response(reply))?;
                }
            }
        }
    }
}

/// Handles a request initiated by the server. Notifications get no reply.
fn answer_server_request(
    sampling: &SamplingHandler,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    debug!(target: targets::SESSION, "<- server request {}", request.method);
    let id: RequestId = request.id?;

    let result = match request.method.as_str() {
        "ping" => Ok(serde_json::json!({})),
        "sampling/createMessage" => request
            .params
            .ok_or_else(|| McpError::invalid_params("Missing required parameters"))
            .and_then(|params| {
                serde_json::from_value::<CreateMessageParams>(params)
                    .map_err(|e| McpError::invalid_params(e.to_string()))
            })
            .and_then(|params| Ok(serde_json::to_value(sampling(&params))?)),
        other => Err(McpError::method_not_found(other)),
    };

    Some(match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(Some(id), e.into()),
    })
}
