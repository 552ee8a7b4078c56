//! Handler traits for tools, resources, and prompts.
//!
//! Handlers are plain synchronous objects. The router owns them boxed and
//! calls them once per request with a fresh [`McpContext`].

use std::collections::HashMap;

use mcpdemo_core::{McpContext, McpResult};
use mcpdemo_protocol::{
    Content, Prompt, PromptMessage, Resource, ResourceContent, ResourceTemplate, Tool,
};

/// Parameters extracted from a resource URI: template placeholders plus any
/// `?key=value` query pairs, percent-decoded.
pub type UriParams = HashMap<String, String>;

/// Handler for a tool.
pub trait ToolHandler: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> Tool;

    /// Calls the tool with arguments already validated against
    /// [`Tool::input_schema`].
    fn call(&self, ctx: &McpContext, arguments: serde_json::Value) -> McpResult<Vec<Content>>;
}

/// Handler for a resource.
///
/// A handler that returns `Some` from [`ResourceHandler::template`] is
/// matched by URI template; otherwise it serves exactly
/// [`Resource::uri`].
pub trait ResourceHandler: Send + Sync {
    /// Returns the resource definition.
    fn definition(&self) -> Resource;

    /// Returns the URI template this handler answers, if any.
    fn template(&self) -> Option<ResourceTemplate> {
        None
    }

    /// Reads the resource at `uri`.
    fn read(
        &self,
        ctx: &McpContext,
        uri: &str,
        params: &UriParams,
    ) -> McpResult<Vec<ResourceContent>>;
}

/// Handler for a prompt.
pub trait PromptHandler: Send + Sync {
    /// Returns the prompt definition.
    fn definition(&self) -> Prompt;

    /// Renders the prompt messages for the given arguments.
    fn get(
        &self,
        ctx: &McpContext,
        arguments: HashMap<String, String>,
    ) -> McpResult<Vec<PromptMessage>>;
}

/// A boxed tool handler.
pub type BoxedToolHandler = Box<dyn ToolHandler>;

/// A boxed resource handler.
pub type BoxedResourceHandler = Box<dyn ResourceHandler>;

/// A boxed prompt handler.
pub type BoxedPromptHandler = Box<dyn PromptHandler>;

// Boxed handlers register like any other, so a table of handlers chosen at
// runtime can be fed straight into the builder.

impl<H: ToolHandler + ?Sized> ToolHandler for Box<H> {
    fn definition(&self) -> Tool {
        (**self).definition()
    }

    fn call(&self, ctx: &McpContext, arguments: serde_json::Value) -> McpResult<Vec<Content>> {
        (**self).call(ctx, arguments)
    }
}

impl<H: ResourceHandler + ?Sized> ResourceHandler for Box<H> {
    fn definition(&self) -> Resource {
        (**self).definition()
    }

    fn template(&self) -> Option<ResourceTemplate> {
        (**self).template()
    }

    fn read(
        &self,
        ctx: &McpContext,
        uri: &str,
        params: &UriParams,
    ) -> McpResult<Vec<ResourceContent>> {
        (**self).read(ctx, uri, params)
    }
}

impl<H: PromptHandler + ?Sized> PromptHandler for Box<H> {
    fn definition(&self) -> Prompt {
        (**self).definition()
    }

    fn get(
        &self,
        ctx: &McpContext,
        arguments: HashMap<String, String>,
    ) -> McpResult<Vec<PromptMessage>> {
        (**self).get(ctx, arguments)
    }
}
