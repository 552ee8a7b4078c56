//! Typed client for the demo host.
//!
//! [`DemoClient`] wraps a connected [`Client`] and addresses every
//! capability through the name enums. Prompt-based calls forward the
//! rendered prompt to the [`OllamaClient`].

use std::collections::HashMap;
use std::path::Path;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use mcpdemo_client::{ChildTransport, Client, ClientBuilder};
use mcpdemo_core::logging::{debug, targets};
use mcpdemo_core::{McpError, McpResult};
use mcpdemo_protocol::{
    Content, GetPromptResult, Prompt, Resource, ResourceTemplate, ServerInfo, Tool,
};
use mcpdemo_transport::Transport;

use crate::bridge::OllamaClient;
use crate::gods::GreekGod;
use crate::names::{PromptName, ResourceName, ToolName};

/// Picks the `mcp_expert` topic mentioned in a chat message.
///
/// `tools` wins over `resources`, which wins over `prompts`; matching is
/// case-insensitive and by substring.
#[must_use]
pub fn detect_topic(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    ["tools", "resources", "prompts"]
        .into_iter()
        .find(|topic| lowered.contains(topic))
}

/// Fills the single placeholder of a template resource with `value`,
/// escaped so the host decodes it back byte for byte.
fn template_uri(resource: ResourceName, value: &str) -> String {
    let pattern = resource.uri_pattern();
    let encoded = utf8_percent_encode(value, NON_ALPHANUMERIC).to_string();
    match (pattern.find('{'), pattern.rfind('}')) {
        (Some(open), Some(close)) if open < close => {
            format!("{}{encoded}{}", &pattern[..open], &pattern[close + 1..])
        }
        _ => pattern.to_string(),
    }
}

/// Everything a host advertises, as printed by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    pub server: ServerInfo,
    pub protocol_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub tools: Vec<Tool>,
    pub resources: Vec<Resource>,
    pub resource_templates: Vec<ResourceTemplate>,
    pub prompts: Vec<Prompt>,
}

/// Typed access to the demo host's capabilities.
pub struct DemoClient<T: Transport = ChildTransport> {
    client: Client<T>,
    ollama: OllamaClient,
}

impl DemoClient {
    /// Spawns the host at `server_path` and performs the handshake.
    ///
    /// # Errors
    ///
    /// Fails with "Server executable not found at {path}" if the path does
    /// not exist, or with the spawn/handshake error otherwise.
    pub fn connect(server_path: &Path, ollama: OllamaClient) -> McpResult<Self> {
        if !server_path.exists() {
            return Err(McpError::internal_error(format!(
                "Server executable not found at {}",
                server_path.display()
            )));
        }
        let client = ClientBuilder::new()
            .name("mcpdemo")
            .connect_stdio(&server_path.to_string_lossy(), &[])?;
        Ok(Self::new(client, ollama))
    }
}

impl<T: Transport> DemoClient<T> {
    /// Wraps an already-initialized client.
    pub fn new(client: Client<T>, ollama: OllamaClient) -> Self {
        Self { client, ollama }
    }

    /// The underlying connection handle.
    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    /// Closes the connection; later calls fail as not connected.
    pub fn close(&mut self) {
        self.client.close();
    }

    fn call_tool(&mut self, name: ToolName, arguments: serde_json::Value) -> McpResult<String> {
        let content = self.client.call_tool(name.as_str(), arguments)?;
        Ok(joined_text(content.iter().map(Content::as_text)))
    }

    fn read_text(&mut self, uri: &str) -> McpResult<String> {
        let contents = self.client.read_resource(uri)?;
        Ok(joined_text(
            contents.iter().filter_map(|c| c.text.as_deref()),
        ))
    }

    /// Mangles `text` through the `ancient_latin_text` tool.
    ///
    /// # Errors
    ///
    /// Returns the connection or tool error.
    pub fn transform_to_ancient_latin(&mut self, text: &str) -> McpResult<String> {
        self.call_tool(ToolName::AncientLatinText, serde_json::json!({"text": text}))
    }

    /// Mangles `text` through the `ancientlatin://` resource.
    ///
    /// # Errors
    ///
    /// Returns the connection or resource error.
    pub fn ancient_latin_resource(&mut self, text: &str) -> McpResult<String> {
        let uri = template_uri(ResourceName::AncientLatinText, text);
        self.read_text(&uri)
    }

    /// Adds two integers with the `add` tool.
    ///
    /// # Errors
    ///
    /// Returns the connection or tool error, or an internal error if the
    /// tool answers with something other than an integer.
    pub fn add(&mut self, a: i64, b: i64) -> McpResult<i64> {
        let text = self.call_tool(ToolName::Add, serde_json::json!({"a": a, "b": b}))?;
        text.trim()
            .parse()
            .map_err(|_| McpError::internal_error(format!("add returned non-integer: {text}")))
    }

    /// Reads up to `limit` rows of the gods table (host default when `None`).
    ///
    /// # Errors
    ///
    /// Returns the connection or resource error, or an internal error if the
    /// JSON does not decode.
    pub fn greek_gods(&mut self, limit: Option<usize>) -> McpResult<Vec<GreekGod>> {
        let base = ResourceName::GreekGods.uri_pattern();
        let uri = match limit {
            Some(limit) => format!("{base}?limit={limit}"),
            None => base.to_string(),
        };
        let text = self.read_text(&uri)?;
        serde_json::from_str(&text)
            .map_err(|e| McpError::internal_error(format!("Invalid gods payload: {e}")))
    }

    /// Reads the greeting for `name`.
    ///
    /// # Errors
    ///
    /// Returns the connection or resource error.
    pub fn greeting(&mut self, name: &str) -> McpResult<String> {
        let uri = template_uri(ResourceName::Greeting, name);
        self.read_text(&uri)
    }

    /// Renders a prompt.
    ///
    /// # Errors
    ///
    /// Returns the connection or prompt error.
    pub fn prompt(
        &mut self,
        name: PromptName,
        arguments: HashMap<String, String>,
    ) -> McpResult<GetPromptResult> {
        self.client.get_prompt(name.as_str(), arguments)
    }

    fn ask(&mut self, name: PromptName, arguments: HashMap<String, String>) -> McpResult<String> {
        let prompt = self.prompt(name, arguments)?;
        debug!(
            target: targets::BRIDGE,
            "Forwarding {} ({} messages) to {}",
            name,
            prompt.messages.len(),
            self.ollama.model()
        );
        Ok(self.ollama.process_prompt(&serde_json::to_value(prompt)?))
    }

    /// Answers a question about MCP through `mcp_expert` and the backend.
    ///
    /// # Errors
    ///
    /// Returns the connection or prompt error. Backend failures come back
    /// as an `"Error: ..."` answer instead.
    pub fn chat_about_mcp(&mut self, message: &str) -> McpResult<String> {
        let mut arguments = HashMap::new();
        if let Some(topic) = detect_topic(message) {
            arguments.insert("topic".to_string(), topic.to_string());
        }
        self.ask(PromptName::McpExpert, arguments)
    }

    /// Reviews `code` through `code_review` and the backend.
    ///
    /// # Errors
    ///
    /// Returns the connection or prompt error.
    pub fn code_review(&mut self, code: &str, language: &str) -> McpResult<String> {
        let arguments = HashMap::from([
            ("code".to_string(), code.to_string()),
            ("language".to_string(), language.to_string()),
        ]);
        self.ask(PromptName::CodeReview, arguments)
    }

    /// Suggests a commit message through `git_commit` and the backend.
    ///
    /// # Errors
    ///
    /// Returns the connection or prompt error.
    pub fn commit_message(&mut self, changes: &str) -> McpResult<String> {
        let arguments = HashMap::from([("changes".to_string(), changes.to_string())]);
        self.ask(PromptName::GitCommit, arguments)
    }

    /// Collects everything the host advertises.
    ///
    /// # Errors
    ///
    /// Returns the connection error or the first failing listing.
    pub fn inspect(&mut self) -> McpResult<CapabilityReport> {
        let server = self.client.server_info()?.clone();
        let protocol_version = self.client.protocol_version()?.to_string();
        let instructions = self.client.instructions()?.map(str::to_string);
        Ok(CapabilityReport {
            server,
            protocol_version,
            instructions,
            tools: self.client.list_tools()?,
            resources: self.client.list_resources()?,
            resource_templates: self.client.list_resource_templates()?,
            prompts: self.client.list_prompts()?,
        })
    }
}

fn joined_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use mcpdemo_core::McpErrorCode;
    use mcpdemo_protocol::Role;
    use mcpdemo_transport::{MemoryTransport, memory_pair};

    use crate::latin::ScriptedRandom;
    use crate::server::{SERVER_NAME, build_server_with};

    /// Runs the real host on a thread, wired to the returned client.
    fn loopback() -> (DemoClient<MemoryTransport>, thread::JoinHandle<()>) {
        let (client_end, server_end) = memory_pair();
        let host = thread::spawn(move || {
            build_server_with(ScriptedRandom::never()).run_transport(server_end);
        });
        let mut client = ClientBuilder::new().connect_transport(client_end);
        client.initialize().unwrap();
        // Nothing listens on port 9; the bridge turns that into an answer.
        let ollama = OllamaClient::new("http://127.0.0.1:9", "test")
            .with_timeout(std::time::Duration::from_secs(5));
        (DemoClient::new(client, ollama), host)
    }

    #[test]
    fn topic_detection_order() {
        assert_eq!(detect_topic("What are TOOLS and resources?"), Some("tools"));
        assert_eq!(detect_topic("explain resources and prompts"), Some("resources"));
        assert_eq!(detect_topic("Prompts please"), Some("prompts"));
        assert_eq!(detect_topic("what is MCP?"), None);
    }

    #[test]
    fn missing_server_is_reported() {
        let err = DemoClient::connect(Path::new("/no/such/mcpdemo-server"), OllamaClient::default())
            .err()
            .unwrap();
        assert_eq!(err.message, "Server executable not found at /no/such/mcpdemo-server");
    }

    #[test]
    fn tools_over_loopback() {
        let (mut demo, host) = loopback();
        assert_eq!(demo.add(5, 3).unwrap(), 8);
        assert_eq!(demo.transform_to_ancient_latin("the end").unwrap(), "thy end");
        demo.close();
        host.join().unwrap();
    }

    #[test]
    fn resources_over_loopback() {
        let (mut demo, host) = loopback();
        assert_eq!(demo.greeting("Jane Doe").unwrap(), "Hello, Jane Doe!");
        assert_eq!(demo.ancient_latin_resource("we will").unwrap(), "nos voluntas");
        assert_eq!(demo.greek_gods(None).unwrap().len(), 10);
        assert_eq!(demo.greek_gods(Some(0)).unwrap().len(), 0);
        assert_eq!(demo.greek_gods(Some(99)).unwrap().len(), 14);
        demo.close();
        host.join().unwrap();
    }

    #[test]
    fn template_values_survive_the_round_trip() {
        let (mut demo, host) = loopback();
        for name in ["100%41", "Jane%20Doe", "what? me", "a&b=c/d#e", "Zoë"] {
            assert_eq!(demo.greeting(name).unwrap(), format!("Hello, {name}!"));
        }
        assert_eq!(demo.ancient_latin_resource("5%2B i?").unwrap(), "5%2B i?");
        demo.close();
        host.join().unwrap();
    }

    #[test]
    fn template_uri_escapes_the_value() {
        assert_eq!(
            template_uri(ResourceName::Greeting, "Jane Doe?"),
            "greeting://Jane%20Doe%3F"
        );
        assert_eq!(template_uri(ResourceName::AncientLatinText, "%41"), "ancientlatin://%2541");
    }

    #[test]
    fn prompts_over_loopback() {
        let (mut demo, host) = loopback();
        let prompt = demo
            .prompt(
                PromptName::GitCommit,
                HashMap::from([("changes".to_string(), "fix typo".to_string())]),
            )
            .unwrap();
        let roles: Vec<_> = prompt.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::User]);
        assert!(prompt.messages[1].content.as_text().ends_with("fix typo"));

        let err = demo.prompt(PromptName::GitCommit, HashMap::new()).unwrap_err();
        assert_eq!(err.code, McpErrorCode::InvalidParams);
        demo.close();
        host.join().unwrap();
    }

    #[test]
    fn backend_failure_is_an_answer() {
        let (mut demo, host) = loopback();
        let answer = demo.chat_about_mcp("tell me about tools").unwrap();
        assert!(answer.starts_with("Error: "), "{answer}");
        demo.close();
        host.join().unwrap();
    }

    #[test]
    fn inspect_lists_everything() {
        let (mut demo, host) = loopback();
        let report = demo.inspect().unwrap();
        assert_eq!(report.server.name, SERVER_NAME);
        assert_eq!(report.tools.len(), 2);
        assert_eq!(report.resources.len(), 1);
        assert_eq!(report.resource_templates.len(), 2);
        assert_eq!(report.prompts.len(), 3);
        assert!(report.instructions.is_some());
        demo.close();
        host.join().unwrap();
    }

    #[test]
    fn calls_after_close_fail() {
        let (mut demo, host) = loopback();
        demo.close();
        host.join().unwrap();
        let err = demo.greeting("x").unwrap_err();
        assert_eq!(err.code, McpErrorCode::NotConnected);
        assert_eq!(err.message, "Not connected to MCP server");
    }
}
