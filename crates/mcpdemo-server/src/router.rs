//! Request router for the MCP host.
//!
//! Tools and prompts are keyed by name. Resources resolve in two passes:
//! static URIs first, then templates in registration order.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use mcpdemo_core::logging::{debug, targets, trace};
use mcpdemo_core::{McpContext, McpError, McpResult, log_router};
use mcpdemo_protocol::{
    CallToolParams, CallToolResult, Content, GetPromptParams, GetPromptResult, InitializeParams,
    InitializeResult, ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult, PROTOCOL_VERSION, Prompt, ReadResourceParams, ReadResourceResult, Resource,
    ResourceTemplate, Tool, validate,
};

use crate::Session;
use crate::handler::{
    BoxedPromptHandler, BoxedResourceHandler, BoxedToolHandler, PromptHandler, ResourceHandler,
    ToolHandler, UriParams,
};

/// Routes MCP requests to the appropriate handlers.
pub struct Router {
    tools: HashMap<String, BoxedToolHandler>,
    resources: HashMap<String, BoxedResourceHandler>,
    resource_templates: Vec<ResourceTemplateEntry>,
    prompts: HashMap<String, BoxedPromptHandler>,
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            resources: HashMap::new(),
            resource_templates: Vec::new(),
            prompts: HashMap::new(),
        }
    }

    /// Adds a tool handler. A later handler with the same name replaces the
    /// earlier one.
    pub fn add_tool<H: ToolHandler + 'static>(&mut self, handler: H) {
        let def = handler.definition();
        log_router!("registering tool {}", def.name);
        self.tools.insert(def.name, Box::new(handler));
    }

    /// Adds a resource handler, either as a static URI or as a template.
    pub fn add_resource<H: ResourceHandler + 'static>(&mut self, handler: H) {
        let boxed: BoxedResourceHandler = Box::new(handler);

        if let Some(template) = boxed.template() {
            log_router!("registering resource template {}", template.uri_template);
            let matcher = UriTemplate::new(&template.uri_template);
            self.resource_templates
                .retain(|entry| entry.template.uri_template != template.uri_template);
            self.resource_templates.push(ResourceTemplateEntry {
                matcher,
                template,
                handler: boxed,
            });
        } else {
            let uri = boxed.definition().uri;
            log_router!("registering resource {uri}");
            self.resources.insert(uri, boxed);
        }
    }

    /// Adds a prompt handler.
    pub fn add_prompt<H: PromptHandler + 'static>(&mut self, handler: H) {
        let def = handler.definition();
        log_router!("registering prompt {}", def.name);
        self.prompts.insert(def.name, Box::new(handler));
    }

    /// Returns all tool definitions, sorted by name.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tools.values().map(|h| h.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Returns all static resource definitions, sorted by URI.
    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> =
            self.resources.values().map(|h| h.definition()).collect();
        resources.sort_by(|a, b| a.uri.cmp(&b.uri));
        resources
    }

    /// Returns all resource templates in registration order.
    #[must_use]
    pub fn resource_templates(&self) -> Vec<ResourceTemplate> {
        self.resource_templates
            .iter()
            .map(|entry| entry.template.clone())
            .collect()
    }

    /// Returns all prompt definitions, sorted by name.
    #[must_use]
    pub fn prompts(&self) -> Vec<Prompt> {
        let mut prompts: Vec<Prompt> = self.prompts.values().map(|h| h.definition()).collect();
        prompts.sort_by(|a, b| a.name.cmp(&b.name));
        prompts
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn tools_count(&self) -> usize {
        self.tools.len()
    }

    /// Returns the number of registered resources, templates included.
    #[must_use]
    pub fn resources_count(&self) -> usize {
        self.resources.len() + self.resource_templates.len()
    }

    /// Returns the number of registered prompts.
    #[must_use]
    pub fn prompts_count(&self) -> usize {
        self.prompts.len()
    }

    /// Returns true if a resource exists for the given URI (static or template match).
    #[must_use]
    pub fn resource_exists(&self, uri: &str) -> bool {
        self.resolve_resource(uri).is_some()
    }

    fn resolve_resource(&self, uri: &str) -> Option<ResolvedResource<'_>> {
        let (path, query) = split_query(uri);

        if let Some(handler) = self.resources.get(path) {
            return Some(ResolvedResource {
                handler,
                params: parse_query(query),
            });
        }

        // Templates see the whole URI first so a `?` inside a template
        // value is kept; the query split is the fallback.
        for entry in &self.resource_templates {
            if let Some(params) = entry.matcher.matches(uri) {
                return Some(ResolvedResource {
                    handler: &entry.handler,
                    params,
                });
            }
        }
        if query.is_some() {
            for entry in &self.resource_templates {
                if let Some(mut params) = entry.matcher.matches(path) {
                    params.extend(parse_query(query));
                    return Some(ResolvedResource {
                        handler: &entry.handler,
                        params,
                    });
                }
            }
        }

        None
    }

    // ========================================================================
    // Request Dispatch Methods
    // ========================================================================

    /// Handles the initialize request.
    pub fn handle_initialize(
        &self,
        session: &mut Session,
        params: InitializeParams,
        instructions: Option<&str>,
    ) -> McpResult<InitializeResult> {
        debug!(
            target: targets::SESSION,
            "Initializing session with client: {:?} (requested protocol {})",
            params.client_info.name,
            params.protocol_version
        );

        session.initialize(
            params.client_info,
            params.capabilities,
            PROTOCOL_VERSION.to_string(),
        );

        Ok(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: session.server_capabilities().clone(),
            server_info: session.server_info().clone(),
            instructions: instructions.map(String::from),
        })
    }

    /// Handles the tools/list request.
    pub fn handle_tools_list(&self) -> McpResult<ListToolsResult> {
        Ok(ListToolsResult {
            tools: self.tools(),
        })
    }

    /// Handles the tools/call request.
    ///
    /// Unknown tools and arguments that fail the input schema are JSON-RPC
    /// errors. A failure inside the handler is reported as tool output with
    /// `isError` set.
    pub fn handle_tools_call(
        &self,
        ctx: &McpContext,
        params: CallToolParams,
    ) -> McpResult<CallToolResult> {
        debug!(target: targets::HANDLER, "Calling tool: {}", params.name);
        trace!(target: targets::HANDLER, "Tool arguments: {:?}", params.arguments);

        let handler = self
            .tools
            .get(&params.name)
            .ok_or_else(|| McpError::method_not_found(&format!("tool: {}", params.name)))?;

        // Tool arguments are always an object on the wire.
        let arguments = params.arguments.unwrap_or_else(|| serde_json::json!({}));
        let tool_def = handler.definition();
        if let Err(validation_errors) = validate(&tool_def.input_schema, &arguments) {
            let error_messages: Vec<String> =
                validation_errors.iter().map(ToString::to_string).collect();
            return Err(McpError::invalid_params(format!(
                "Input validation failed: {}",
                error_messages.join("; ")
            )));
        }

        match handler.call(ctx, arguments) {
            Ok(content) => Ok(CallToolResult {
                content,
                is_error: false,
            }),
            Err(e) => {
                debug!(target: targets::HANDLER, "Tool {} failed: {}", params.name, e);
                Ok(CallToolResult {
                    content: vec![Content::text(e.message)],
                    is_error: true,
                })
            }
        }
    }

    /// Handles the resources/list request.
    pub fn handle_resources_list(&self) -> McpResult<ListResourcesResult> {
        Ok(ListResourcesResult {
            resources: self.resources(),
        })
    }

    /// Handles the resources/templates/list request.
    pub fn handle_resource_templates_list(&self) -> McpResult<ListResourceTemplatesResult> {
        Ok(ListResourceTemplatesResult {
            resource_templates: self.resource_templates(),
        })
    }

    /// Handles the resources/read request.
    pub fn handle_resources_read(
        &self,
        ctx: &McpContext,
        params: &ReadResourceParams,
    ) -> McpResult<ReadResourceResult> {
        debug!(target: targets::HANDLER, "Reading resource: {}", params.uri);

        let resolved = self
            .resolve_resource(&params.uri)
            .ok_or_else(|| McpError::resource_not_found(&params.uri))?;
        trace!(target: targets::HANDLER, "Resource params: {:?}", resolved.params);

        let contents = resolved.handler.read(ctx, &params.uri, &resolved.params)?;
        Ok(ReadResourceResult { contents })
    }

    /// Handles the prompts/list request.
    pub fn handle_prompts_list(&self) -> McpResult<ListPromptsResult> {
        Ok(ListPromptsResult {
            prompts: self.prompts(),
        })
    }

    /// Handles the prompts/get request.
    pub fn handle_prompts_get(
        &self,
        ctx: &McpContext,
        params: GetPromptParams,
    ) -> McpResult<GetPromptResult> {
        debug!(target: targets::HANDLER, "Getting prompt: {}", params.name);
        trace!(target: targets::HANDLER, "Prompt arguments: {:?}", params.arguments);

        let handler = self
            .prompts
            .get(&params.name)
            .ok_or_else(|| McpError::prompt_not_found(&params.name))?;

        let messages = handler.get(ctx, params.arguments.unwrap_or_default())?;

        Ok(GetPromptResult {
            description: handler.definition().description,
            messages,
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

struct ResolvedResource<'a> {
    handler: &'a BoxedResourceHandler,
    params: UriParams,
}

struct ResourceTemplateEntry {
    matcher: UriTemplate,
    template: ResourceTemplate,
    handler: BoxedResourceHandler,
}

/// RFC 6570 level-1 matcher: literal runs and `{name}` placeholders.
#[derive(Debug, Clone)]
struct UriTemplate {
    segments: Vec<UriSegment>,
}

#[derive(Debug, Clone)]
enum UriSegment {
    Literal(String),
    Param(String),
}

impl UriTemplate {
    fn new(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(ch) = chars.next() {
            if ch == '{' {
                if !literal.is_empty() {
                    segments.push(UriSegment::Literal(std::mem::take(&mut literal)));
                }

                let mut name = String::new();
                for next in chars.by_ref() {
                    if next == '}' {
                        break;
                    }
                    name.push(next);
                }

                if name.is_empty() {
                    literal.push_str("{}");
                } else {
                    segments.push(UriSegment::Param(name));
                }
            } else {
                literal.push(ch);
            }
        }

        if !literal.is_empty() {
            segments.push(UriSegment::Literal(literal));
        }

        Self { segments }
    }

    fn matches(&self, uri: &str) -> Option<UriParams> {
        let mut params = UriParams::new();
        let mut remainder = uri;
        let mut iter = self.segments.iter().peekable();

        while let Some(segment) = iter.next() {
            match segment {
                UriSegment::Literal(lit) => {
                    remainder = remainder.strip_prefix(lit.as_str())?;
                }
                UriSegment::Param(name) => {
                    let value = match iter.peek() {
                        Some(UriSegment::Literal(lit)) => {
                            let idx = remainder.find(lit.as_str())?;
                            let value = &remainder[..idx];
                            remainder = &remainder[idx..];
                            value
                        }
                        // Adjacent placeholders are ambiguous.
                        Some(UriSegment::Param(_)) => return None,
                        None => std::mem::take(&mut remainder),
                    };
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), percent_decode(value));
                }
            }
        }

        remainder.is_empty().then_some(params)
    }
}

fn split_query(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}

fn parse_query(query: Option<&str>) -> UriParams {
    query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(&value.replace('+', " ")))
        })
        .collect()
}

/// Decodes `%XX` escapes. Malformed escapes are kept verbatim.
fn percent_decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_captures_trailing_param() {
        let template = UriTemplate::new("greeting://{name}");
        let params = template.matches("greeting://World").unwrap();
        assert_eq!(params["name"], "World");
        assert!(template.matches("greeting://").is_none());
        assert!(template.matches("other://World").is_none());
    }

    #[test]
    fn template_with_inner_literal() {
        let template = UriTemplate::new("gods://text/{limit}/raw");
        let params = template.matches("gods://text/5/raw").unwrap();
        assert_eq!(params["limit"], "5");
        assert!(template.matches("gods://text/5").is_none());
    }

    #[test]
    fn template_values_are_percent_decoded() {
        let template = UriTemplate::new("greeting://{name}");
        let params = template.matches("greeting://Jane%20Doe").unwrap();
        assert_eq!(params["name"], "Jane Doe");
    }

    #[test]
    fn percent_decode_keeps_malformed_escapes() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("%4"), "%4");
    }

    #[test]
    fn query_pairs() {
        let params = parse_query(Some("limit=5&flag&name=a+b"));
        assert_eq!(params["limit"], "5");
        assert_eq!(params["flag"], "");
        assert_eq!(params["name"], "a b");
        assert!(parse_query(None).is_empty());
    }
}
