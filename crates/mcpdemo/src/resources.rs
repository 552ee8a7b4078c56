//! Resource handlers: the gods table, the Latin mangler, and greetings.

use std::sync::Arc;

use mcpdemo_core::{McpContext, McpError, McpResult, log_handler};
use mcpdemo_protocol::{Resource, ResourceContent, ResourceTemplate};
use mcpdemo_server::{BoxedResourceHandler, ResourceHandler, UriParams};

use crate::gods::{greek_gods, parse_limit};
use crate::latin::Mangler;
use crate::names::ResourceName;

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// Returns `"Hello, {name}!"`.
#[must_use]
pub fn greeting(name: &str) -> String {
    format!("Hello, {name}!")
}

/// Returns the handler serving `name`.
#[must_use]
pub fn resource_handler(name: ResourceName, mangler: &Arc<Mangler>) -> BoxedResourceHandler {
    match name {
        ResourceName::GreekGods => Box::new(GodsResource),
        ResourceName::AncientLatinText => Box::new(LatinResource {
            mangler: Arc::clone(mangler),
        }),
        ResourceName::Greeting => Box::new(GreetingResource),
    }
}

fn definition(name: ResourceName, description: &str, mime_type: &str) -> Resource {
    Resource {
        uri: name.uri_pattern().to_string(),
        name: name.as_str().to_string(),
        description: Some(description.to_string()),
        mime_type: Some(mime_type.to_string()),
    }
}

fn template_of(resource: Resource) -> ResourceTemplate {
    ResourceTemplate {
        uri_template: resource.uri,
        name: resource.name,
        description: resource.description,
        mime_type: resource.mime_type,
    }
}

fn param<'a>(params: &'a UriParams, key: &str) -> McpResult<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| McpError::invalid_params(format!("Missing URI parameter: {key}")))
}

/// `gods://[?limit=N]`: the Greek gods table as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct GodsResource;

impl ResourceHandler for GodsResource {
    fn definition(&self) -> Resource {
        definition(
            ResourceName::GreekGods,
            "Information about Greek gods (use ?limit=N, default 10)",
            APPLICATION_JSON,
        )
    }

    fn read(
        &self,
        _ctx: &McpContext,
        uri: &str,
        params: &UriParams,
    ) -> McpResult<Vec<ResourceContent>> {
        let limit = parse_limit(params.get("limit").map(String::as_str))?;
        let gods = greek_gods(limit);
        log_handler!("serving {} gods (limit {})", gods.len(), limit);
        Ok(vec![ResourceContent::text(
            uri,
            APPLICATION_JSON,
            serde_json::to_string(&gods)?,
        )])
    }
}

/// `ancientlatin://{text}`: the mangler as a resource.
#[derive(Debug)]
pub struct LatinResource {
    mangler: Arc<Mangler>,
}

impl ResourceHandler for LatinResource {
    fn definition(&self) -> Resource {
        definition(
            ResourceName::AncientLatinText,
            "Text transformed to resemble ancient Latin",
            TEXT_PLAIN,
        )
    }

    fn template(&self) -> Option<ResourceTemplate> {
        Some(template_of(self.definition()))
    }

    fn read(
        &self,
        _ctx: &McpContext,
        uri: &str,
        params: &UriParams,
    ) -> McpResult<Vec<ResourceContent>> {
        let latin = self.mangler.transform(param(params, "text")?)?;
        Ok(vec![ResourceContent::text(uri, TEXT_PLAIN, latin)])
    }
}

/// `greeting://{name}`: a personalized greeting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingResource;

impl ResourceHandler for GreetingResource {
    fn definition(&self) -> Resource {
        definition(
            ResourceName::Greeting,
            "A personalized greeting for the given name",
            TEXT_PLAIN,
        )
    }

    fn template(&self) -> Option<ResourceTemplate> {
        Some(template_of(self.definition()))
    }

    fn read(
        &self,
        _ctx: &McpContext,
        uri: &str,
        params: &UriParams,
    ) -> McpResult<Vec<ResourceContent>> {
        Ok(vec![ResourceContent::text(
            uri,
            TEXT_PLAIN,
            greeting(param(params, "name")?),
        )])
    }
}
