//! Assembles the demo host.

use std::sync::Arc;

use mcpdemo_core::log_server;
use mcpdemo_server::Server;

use crate::latin::{Mangler, RandomSource};
use crate::names::{PromptName, ResourceName, ToolName};
use crate::prompts::PromptTemplate;
use crate::resources::resource_handler;
use crate::tools::tool_handler;

/// Name the host reports in `initialize`.
pub const SERVER_NAME: &str = "MCP Demo Server";

const INSTRUCTIONS: &str = "Demo host exposing a Latin text mangler and an add tool, \
a Greek gods table plus greeting and Latin resources, and three prompt templates \
(mcp_expert, code_review, git_commit).";

/// Builds the host with an OS-seeded random source.
#[must_use]
pub fn build_server() -> Server {
    build_server_with(fastrand::Rng::new())
}

/// Builds the host drawing mangler randomness from `rng`.
///
/// One handler is registered per [`ToolName`], [`ResourceName`] and
/// [`PromptName`] variant.
pub fn build_server_with<R: RandomSource + Send + 'static>(rng: R) -> Server {
    let mangler = Arc::new(Mangler::new(rng));
    let mut builder = Server::new(SERVER_NAME, env!("CARGO_PKG_VERSION")).instructions(INSTRUCTIONS);

    for name in ToolName::ALL {
        builder = builder.tool(tool_handler(*name, &mangler));
    }
    for name in ResourceName::ALL {
        builder = builder.resource(resource_handler(*name, &mangler));
    }
    for name in PromptName::ALL {
        builder = builder.prompt(PromptTemplate::new(*name));
    }

    let server = builder.build();
    log_server!(
        "registered {} tools, {} resources, {} templates, {} prompts",
        server.tools().len(),
        server.resources().len(),
        server.resource_templates().len(),
        server.prompts().len()
    );
    server
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latin::ScriptedRandom;

    #[test]
    fn every_name_is_registered() {
        let server = build_server_with(ScriptedRandom::never());

        let tools: Vec<_> = server.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(tools, ["add", "ancient_latin_text"]);

        let resources: Vec<_> = server.resources().into_iter().map(|r| r.uri).collect();
        assert_eq!(resources, ["gods://"]);

        let templates: Vec<_> = server
            .resource_templates()
            .into_iter()
            .map(|t| t.uri_template)
            .collect();
        assert_eq!(templates, ["ancientlatin://{text}", "greeting://{name}"]);

        let prompts: Vec<_> = server.prompts().into_iter().map(|p| p.name).collect();
        assert_eq!(prompts, ["code_review", "git_commit", "mcp_expert"]);
    }

    #[test]
    fn advertises_all_capability_kinds() {
        let server = build_server();
        let caps = server.capabilities();
        assert!(caps.tools.is_some());
        assert!(caps.resources.is_some());
        assert!(caps.prompts.is_some());
        assert_eq!(server.info().name, SERVER_NAME);
    }
}
