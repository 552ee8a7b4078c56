//! MCP host implementation for mcpdemo.
//!
//! This crate provides the server side:
//! - Server builder pattern
//! - Tool, resource, and prompt registration
//! - Request routing and dispatching
//! - Session handshake tracking
//!
//! # Example
//!
//! ```ignore
//! use mcpdemo_server::Server;
//!
//! fn main() {
//!     Server::new("my-server", "1.0.0")
//!         .tool(EchoTool)
//!         .build()
//!         .run_stdio();
//! }
//! ```

#![forbid(unsafe_code)]

mod builder;
mod handler;
mod router;
mod session;


pub use builder::ServerBuilder;
pub use handler::{
    BoxedPromptHandler, BoxedResourceHandler, BoxedToolHandler, PromptHandler, ResourceHandler,
    ToolHandler, UriParams,
};
pub use router::Router;
pub use session::Session;

use mcpdemo_core::logging::{debug, error, targets, warn};
use mcpdemo_core::{McpContext, McpError, log_server};
use mcpdemo_protocol::{
    CallToolParams, GetPromptParams, InitializeParams, JsonRpcError, JsonRpcMessage,
    JsonRpcRequest, JsonRpcResponse, ListPromptsParams, ListResourcesParams, ListToolsParams,
    Prompt, ReadResourceParams, RequestId, Resource, ResourceTemplate, ServerCapabilities,
    ServerInfo, Tool,
};
use mcpdemo_transport::{CodecError, StdioTransport, Transport, TransportError};

/// An MCP server instance.
///
/// Servers are built using [`ServerBuilder`] and serve one session over a
/// [`Transport`] until the peer closes it.
pub struct Server {
    info: ServerInfo,
    capabilities: ServerCapabilities,
    router: Router,
    instructions: Option<String>,
}

impl Server {
    /// Creates a new server builder.
    #[must_use]
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> ServerBuilder {
        ServerBuilder::new(name, version)
    }

    /// Returns the server info.
    #[must_use]
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Returns the server capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    /// Lists all registered tools.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.router.tools()
    }

    /// Lists all registered static resources.
    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        self.router.resources()
    }

    /// Lists all registered resource templates.
    #[must_use]
    pub fn resource_templates(&self) -> Vec<ResourceTemplate> {
        self.router.resource_templates()
    }

    /// Lists all registered prompts.
    #[must_use]
    pub fn prompts(&self) -> Vec<Prompt> {
        self.router.prompts()
    }

    /// Serves one session on the process's stdin/stdout.
    ///
    /// Returns when stdin reaches end of file.
    pub fn run_stdio(self) {
        self.run_transport(StdioTransport::stdio());
    }

    /// Serves one session on an arbitrary transport.
    ///
    /// Returns when the transport reports the peer has gone.
    pub fn run_transport<T: Transport>(self, mut transport: T) {
        log_server!(
            "{} {} ready ({} tools, {} resources, {} prompts)",
            self.info.name,
            self.info.version,
            self.router.tools_count(),
            self.router.resources_count(),
            self.router.prompts_count()
        );

        let mut session = Session::new(self.info.clone(), self.capabilities.clone());

        loop {
            let message = match transport.recv() {
                Ok(msg) => msg,
                Err(e) if e.is_closed() => break,
                Err(TransportError::Codec(CodecError::Json(e))) => {
                    warn!(target: targets::TRANSPORT, "Dropping malformed line: {}", e);
                    let response = JsonRpcResponse::error(
                        None,
                        McpError::parse_error(format!("Parse error: {e}")).into(),
                    );
                    self.send_response(&mut transport, response);
                    continue;
                }
                Err(e) => {
                    error!(target: targets::TRANSPORT, "Transport error: {}", e);
                    continue;
                }
            };

            let response = match message {
                JsonRpcMessage::Request(request) => self.handle_request(&mut session, request),
                // The host never issues requests, so responses are unexpected.
                JsonRpcMessage::Response(response) => {
                    debug!(target: targets::SERVER, "Ignoring response {:?}", response.id);
                    None
                }
            };

            if let Some(response) = response {
                self.send_response(&mut transport, response);
            }
        }

        if let Err(e) = transport.close() {
            debug!(target: targets::TRANSPORT, "Close failed: {}", e);
        }
        log_server!("{} shutting down", self.info.name);
    }

    fn send_response<T: Transport>(&self, transport: &mut T, response: JsonRpcResponse) {
        let id = response.id.clone();
        let Err(e) = transport.send(&JsonRpcMessage::Response(response)) else {
            return;
        };
        error!(target: targets::TRANSPORT, "Failed to send response: {}", e);

        // The caller is still waiting on this id; answer with something that fits.
        let Some(id) = id.filter(|_| !e.is_closed()) else {
            return;
        };
        let fallback = JsonRpcResponse::error(
            Some(id),
            McpError::internal_error(format!("Failed to send response: {e}")).into(),
        );
        if let Err(e) = transport.send(&JsonRpcMessage::Response(fallback)) {
            error!(target: targets::TRANSPORT, "Failed to send error response: {}", e);
        }
    }

    /// Handles a single JSON-RPC request; notifications yield no response.
    fn handle_request(
        &self,
        session: &mut Session,
        request: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let method = request.method.clone();

        let mut ctx = McpContext::new(request_id_to_u64(id.as_ref()));
        if let Some(client) = session.client_info() {
            ctx = ctx.with_client(client.name.clone());
        }

        let result = self.dispatch_method(&ctx, session, &method, request.params);

        // A notification (no ID) must not be answered.
        let Some(response_id) = id else {
            if let Err(e) = result {
                error!(
                    target: targets::HANDLER,
                    "Notification '{}' failed: {}", method, e
                );
            }
            return None;
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(response_id, value),
            Err(e) => {
                debug!(target: targets::SERVER, "{} failed: {}", method, e);
                JsonRpcResponse::error(Some(response_id), JsonRpcError::from(e))
            }
        })
    }

    /// Dispatches a request to the appropriate handler.
    fn dispatch_method(
        &self,
        ctx: &McpContext,
        session: &mut Session,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, McpError> {
        debug!(target: targets::ROUTER, "Dispatching {} (request {})", method, ctx.request_id());

        // Only the handshake and health checks are served before `initialize`.
        if !session.is_initialized() && method != "initialize" && method != "ping" {
            return Err(McpError::invalid_request(
                "Server not initialized. Client must send 'initialize' first.",
            ));
        }

        match method {
            "initialize" => {
                let params: InitializeParams = parse_params(params)?;
                let result = self.router.handle_initialize(
                    session,
                    params,
                    self.instructions.as_deref(),
                )?;
                debug!(
                    target: targets::SESSION,
                    "Client sampling support: {}",
                    session.client_supports_sampling()
                );
                Ok(serde_json::to_value(result)?)
            }
            "notifications/initialized" => Ok(serde_json::Value::Null),
            "tools/list" => {
                let _params: ListToolsParams = parse_params_or_default(params)?;
                Ok(serde_json::to_value(self.router.handle_tools_list()?)?)
            }
            "tools/call" => {
                let params: CallToolParams = parse_params(params)?;
                Ok(serde_json::to_value(
                    self.router.handle_tools_call(ctx, params)?,
                )?)
            }
            "resources/list" => {
                let _params: ListResourcesParams = parse_params_or_default(params)?;
                Ok(serde_json::to_value(self.router.handle_resources_list()?)?)
            }
            "resources/templates/list" => Ok(serde_json::to_value(
                self.router.handle_resource_templates_list()?,
            )?),
            "resources/read" => {
                let params: ReadResourceParams = parse_params(params)?;
                Ok(serde_json::to_value(
                    self.router.handle_resources_read(ctx, &params)?,
                )?)
            }
            "prompts/list" => {
                let _params: ListPromptsParams = parse_params_or_default(params)?;
                Ok(serde_json::to_value(self.router.handle_prompts_list()?)?)
            }
            "prompts/get" => {
                let params: GetPromptParams = parse_params(params)?;
                Ok(serde_json::to_value(
                    self.router.handle_prompts_get(ctx, params)?,
                )?)
            }
            "ping" => Ok(serde_json::json!({})),
            _ => Err(McpError::method_not_found(method)),
        }
    }
}

/// Parses required parameters from JSON.
fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<serde_json::Value>,
) -> Result<T, McpError> {
    let value = params.ok_or_else(|| McpError::invalid_params("Missing required parameters"))?;
    serde_json::from_value(value).map_err(|e| McpError::invalid_params(e.to_string()))
}

/// Parses optional parameters from JSON, using default if not provided.
fn parse_params_or_default<T: serde::de::DeserializeOwned + Default>(
    params: Option<serde_json::Value>,
) -> Result<T, McpError> {
    match params {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| McpError::invalid_params(e.to_string()))
        }
        None => Ok(T::default()),
    }
}

/// Converts a JSON-RPC id to the numeric id carried in [`McpContext`].
///
/// String and absent ids map to 0.
fn request_id_to_u64(id: Option<&RequestId>) -> u64 {
    match id {
        Some(RequestId::Number(n)) => (*n).try_into().unwrap_or(0),
        Some(RequestId::String(_)) | None => 0,
    }
}
