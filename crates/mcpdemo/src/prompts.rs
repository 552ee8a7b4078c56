//! The three demo prompts.
//!
//! Each prompt is a pure function of its arguments returning exactly two
//! messages: a system framing followed by the user request.

use std::collections::HashMap;

use mcpdemo_core::{McpContext, McpError, McpResult, log_handler};
use mcpdemo_protocol::{Prompt, PromptArgument, PromptMessage};
use mcpdemo_server::PromptHandler;

use crate::names::PromptName;

/// Language assumed by `code_review` when none is given.
pub const DEFAULT_LANGUAGE: &str = "python";

const EXPERT_BASE: &str = "You are an MCP (Model Control Protocol) expert assistant. Your goal is to provide accurate, \n\
helpful information about the MCP protocol, its components, and how to use it effectively.\n\
\n\
The MCP protocol consists of three main components:\n\
1. Tools: Model-controlled functions that allow AI models to take actions\n\
2. Resources: Application-controlled data that models can access but not modify\n\
3. Prompts: User-controlled templates for AI interactions\n\
\n\
When answering questions about MCP, focus on:\n\
- Explaining concepts clearly with examples\n\
- Providing practical implementation advice\n\
- Suggesting best practices for MCP architecture\n\
- Helping troubleshoot common issues\n\
\n\
Remember that MCP is designed to create safer, more controllable AI systems by clearly \n\
defining the boundaries between model control, application control, and user control.";

const TOPIC_TOOLS: &str = "\n\
Tools in MCP are model-controlled functions that allow AI models to take actions.\n\
They are defined on the server side and can be invoked by the client.\n\
Tools have a name, description, and parameters, and they return a result.\n\
Examples include text transformation, data processing, or external API calls.";

const TOPIC_RESOURCES: &str = "\n\
Resources in MCP are application-controlled data that models can access but not modify.\n\
They are defined on the server side and can be accessed by the client.\n\
Resources have a URI and can return various types of data.\n\
Examples include database records, file contents, or API responses.";

const TOPIC_PROMPTS: &str = "\n\
Prompts in MCP are user-controlled templates for AI interactions.\n\
They are defined on the server side and can be used by the client.\n\
Prompts have a name, description, and optional arguments.\n\
They return structured messages with roles and content.\n\
Prompts can include dynamic content from resources and support multi-step workflows.";

/// Builds the `mcp_expert` messages.
///
/// A `topic` of `tools`, `resources` or `prompts` (any case) extends the
/// system framing; any other non-empty topic is only echoed back in the
/// user message.
#[must_use]
pub fn mcp_expert(topic: Option<&str>) -> Vec<PromptMessage> {
    let topic = topic.filter(|t| !t.is_empty());
    let extra = match topic.map(str::to_lowercase).as_deref() {
        Some("tools") => TOPIC_TOOLS,
        Some("resources") => TOPIC_RESOURCES,
        Some("prompts") => TOPIC_PROMPTS,
        _ => "",
    };
    vec![
        PromptMessage::system(format!("{EXPERT_BASE}{extra}")),
        PromptMessage::user(format!(
            "Please tell me about {}",
            topic.unwrap_or("MCP in general")
        )),
    ]
}

/// Builds the `code_review` messages; `language` defaults to python.
#[must_use]
pub fn code_review(code: &str, language: Option<&str>) -> Vec<PromptMessage> {
    let language = language.unwrap_or(DEFAULT_LANGUAGE);
    vec![
        PromptMessage::system(format!(
            "You are an expert {language} developer. Your task is to review code and provide constructive feedback."
        )),
        PromptMessage::user(format!(
            "Please review this {language} code and suggest improvements:\n\n```{language}\n{code}\n```"
        )),
    ]
}

/// Builds the `git_commit` messages.
#[must_use]
pub fn git_commit(changes: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(
            "You are an expert at writing clear, concise, and informative Git commit messages.",
        ),
        PromptMessage::user(format!(
            "Generate a commit message for these changes:\n\n{changes}"
        )),
    ]
}

/// Serves one [`PromptName`] over MCP.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    name: PromptName,
}

impl PromptTemplate {
    /// Creates the handler for `name`.
    #[must_use]
    pub fn new(name: PromptName) -> Self {
        Self { name }
    }
}

fn argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: Some(description.to_string()),
        required,
    }
}

fn required<'a>(arguments: &'a HashMap<String, String>, key: &str) -> McpResult<&'a str> {
    arguments
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| McpError::invalid_params(format!("Missing required argument: {key}")))
}

impl PromptHandler for PromptTemplate {
    fn definition(&self) -> Prompt {
        let (description, arguments) = match self.name {
            PromptName::McpExpert => (
                "Get a prompt template for answering questions about MCP",
                vec![argument(
                    "topic",
                    "Optional MCP topic to focus on: tools, resources or prompts",
                    false,
                )],
            ),
            PromptName::CodeReview => (
                "Get a prompt template for code review",
                vec![
                    argument("code", "The code to review", true),
                    argument("language", "The programming language of the code", false),
                ],
            ),
            PromptName::GitCommit => (
                "Get a prompt template for generating Git commit messages",
                vec![argument("changes", "Git diff or description of changes", true)],
            ),
        };
        Prompt {
            name: self.name.as_str().to_string(),
            description: Some(description.to_string()),
            arguments,
        }
    }

    fn get(
        &self,
        _ctx: &McpContext,
        arguments: HashMap<String, String>,
    ) -> McpResult<Vec<PromptMessage>> {
        log_handler!("rendering prompt {}", self.name);
        match self.name {
            PromptName::McpExpert => Ok(mcp_expert(arguments.get("topic").map(String::as_str))),
            PromptName::CodeReview => Ok(code_review(
                required(&arguments, "code")?,
                arguments.get("language").map(String::as_str),
            )),
            PromptName::GitCommit => Ok(git_commit(required(&arguments, "changes")?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdemo_core::McpErrorCode;
    use mcpdemo_protocol::Role;

    fn roles(messages: &[PromptMessage]) -> Vec<Role> {
        messages.iter().map(|m| m.role).collect()
    }

    fn text(message: &PromptMessage) -> &str {
        message.content.as_text()
    }

    #[test]
    fn mcp_expert_without_topic() {
        let messages = mcp_expert(None);
        assert_eq!(roles(&messages), [Role::System, Role::User]);
        assert_eq!(text(&messages[0]), EXPERT_BASE);
        assert_eq!(text(&messages[1]), "Please tell me about MCP in general");
        assert!(text(&messages[0]).contains("1. Tools:"));
        assert!(text(&messages[0]).contains("2. Resources:"));
        assert!(text(&messages[0]).contains("3. Prompts:"));
    }

    #[test]
    fn mcp_expert_topic_is_case_insensitive() {
        let messages = mcp_expert(Some("Resources"));
        assert!(text(&messages[0]).ends_with(TOPIC_RESOURCES));
        assert_eq!(text(&messages[1]), "Please tell me about Resources");
    }

    #[test]
    fn mcp_expert_unknown_topic_only_echoes() {
        let messages = mcp_expert(Some("sampling"));
        assert_eq!(text(&messages[0]), EXPERT_BASE);
        assert_eq!(text(&messages[1]), "Please tell me about sampling");
    }

    #[test]
    fn mcp_expert_empty_topic_is_general() {
        let messages = mcp_expert(Some(""));
        assert_eq!(text(&messages[1]), "Please tell me about MCP in general");
    }

    #[test]
    fn base_prompt_keeps_line_breaks_and_trailing_spaces() {
        assert!(EXPERT_BASE.contains("accurate, \nhelpful"));
        assert!(EXPERT_BASE.contains("by clearly \ndefining"));
        assert!(TOPIC_TOOLS.starts_with('\n'));
    }

    #[test]
    fn code_review_wraps_code_in_fence() {
        let code = "fn main() {\n    println!(\"hi\");\n}";
        let messages = code_review(code, Some("rust"));
        assert_eq!(roles(&messages), [Role::System, Role::User]);
        assert!(text(&messages[0]).starts_with("You are an expert rust developer."));
        assert_eq!(
            text(&messages[1]),
            format!("Please review this rust code and suggest improvements:\n\n```rust\n{code}\n```")
        );
    }

    #[test]
    fn code_review_defaults_to_python() {
        let messages = code_review("x = 1", None);
        assert!(text(&messages[1]).contains("```python\nx = 1\n```"));
    }

    #[test]
    fn git_commit_embeds_changes() {
        let messages = git_commit("Fix typo in README");
        assert_eq!(roles(&messages), [Role::System, Role::User]);
        assert_eq!(
            text(&messages[1]),
            "Generate a commit message for these changes:\n\nFix typo in README"
        );
    }

    #[test]
    fn handler_requires_arguments() {
        let ctx = McpContext::new(1);
        let err = PromptTemplate::new(PromptName::GitCommit)
            .get(&ctx, HashMap::new())
            .unwrap_err();
        assert_eq!(err.code, McpErrorCode::InvalidParams);
        assert!(err.message.contains("changes"));

        let err = PromptTemplate::new(PromptName::CodeReview)
            .get(&ctx, HashMap::new())
            .unwrap_err();
        assert!(err.message.contains("code"));
    }

    #[test]
    fn handler_definitions_match_names() {
        for name in PromptName::ALL {
            let def = PromptTemplate::new(*name).definition();
            assert_eq!(def.name, name.as_str());
        }
        let review = PromptTemplate::new(PromptName::CodeReview).definition();
        let required: Vec<_> = review
            .arguments
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(required, ["code"]);
    }
}
