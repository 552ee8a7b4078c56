//! Request-scoped context handed to tool, resource and prompt handlers.

/// MCP context for a single request.
///
/// Carries the request identity so handlers can tag their log lines, plus
/// the name of the client that opened the session.
#[derive(Debug, Clone, Default)]
pub struct McpContext {
    /// Request identifier for tracing (from the JSON-RPC id).
    request_id: u64,
    /// Client name from the `initialize` handshake.
    client_name: Option<String>,
}

impl McpContext {
    /// Creates a context for the given request.
    #[must_use]
    pub fn new(request_id: u64) -> Self {
        Self {
            request_id,
            client_name: None,
        }
    }

    /// Attaches the session's client name.
    #[must_use]
    pub fn with_client(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Returns the client name, if the session recorded one.
    #[must_use]
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_request_and_client() {
        let ctx = McpContext::new(7).with_client("mcpdemo");
        assert_eq!(ctx.request_id(), 7);
        assert_eq!(ctx.client_name(), Some("mcpdemo"));
        assert_eq!(McpContext::default().client_name(), None);
    }
}
