//! Tool handlers.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use mcpdemo_core::{McpContext, McpError, McpResult, log_handler};
use mcpdemo_protocol::{Content, Tool};
use mcpdemo_server::{BoxedToolHandler, ToolHandler};

use crate::latin::Mangler;
use crate::names::ToolName;

/// Returns the handler serving `name`.
#[must_use]
pub fn tool_handler(name: ToolName, mangler: &Arc<Mangler>) -> BoxedToolHandler {
    match name {
        ToolName::Add => Box::new(AddTool),
        ToolName::AncientLatinText => Box::new(LatinTool {
            mangler: Arc::clone(mangler),
        }),
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: serde_json::Value) -> McpResult<T> {
    serde_json::from_value(arguments).map_err(|e| McpError::invalid_params(e.to_string()))
}

#[derive(Deserialize)]
struct AddArgs {
    a: i64,
    b: i64,
}

/// `add(a, b)`: integer sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddTool;

impl ToolHandler for AddTool {
    fn definition(&self) -> Tool {
        Tool {
            name: ToolName::Add.as_str().to_string(),
            description: Some("Add two numbers together".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "a": {"type": "integer", "description": "First number"},
                    "b": {"type": "integer", "description": "Second number"},
                },
                "required": ["a", "b"],
            }),
        }
    }

    fn call(&self, _ctx: &McpContext, arguments: serde_json::Value) -> McpResult<Vec<Content>> {
        let AddArgs { a, b } = parse_arguments(arguments)?;
        let sum = a
            .checked_add(b)
            .ok_or_else(|| McpError::tool_error(format!("{a} + {b} overflows a 64-bit integer")))?;
        log_handler!("add({a}, {b}) = {sum}");
        Ok(vec![Content::text(sum.to_string())])
    }
}

#[derive(Deserialize)]
struct LatinArgs {
    text: String,
}

/// `ancient_latin_text(text)`: the mock-Latin mangler.
#[derive(Debug)]
pub struct LatinTool {
    mangler: Arc<Mangler>,
}

impl ToolHandler for LatinTool {
    fn definition(&self) -> Tool {
        Tool {
            name: ToolName::AncientLatinText.as_str().to_string(),
            description: Some(
                "Transform text to appear as if written in ancient Latin".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string", "description": "The input text to transform"},
                },
                "required": ["text"],
            }),
        }
    }

    fn call(&self, _ctx: &McpContext, arguments: serde_json::Value) -> McpResult<Vec<Content>> {
        let LatinArgs { text } = parse_arguments(arguments)?;
        let latin = self.mangler.transform(&text)?;
        log_handler!("mangled {} chars into {}", text.len(), latin.len());
        Ok(vec![Content::text(latin)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latin::ScriptedRandom;
    use mcpdemo_core::McpErrorCode;

    fn mangler() -> Arc<Mangler> {
        Arc::new(Mangler::new(ScriptedRandom::never()))
    }

    #[test]
    fn add_sums_integers() {
        let out = AddTool
            .call(&McpContext::new(1), json!({"a": 5, "b": -3}))
            .unwrap();
        assert_eq!(out, vec![Content::text("2")]);
    }

    #[test]
    fn add_overflow_is_a_tool_error() {
        let err = AddTool
            .call(&McpContext::new(1), json!({"a": i64::MAX, "b": 1}))
            .unwrap_err();
        assert_eq!(err.code, McpErrorCode::ToolExecutionError);
    }

    #[test]
    fn latin_tool_mangles() {
        let tool = tool_handler(ToolName::AncientLatinText, &mangler());
        let out = tool
            .call(&McpContext::new(1), json!({"text": "The end"}))
            .unwrap();
        assert_eq!(out, vec![Content::text("Thy end")]);
    }

    #[test]
    fn definitions_match_names() {
        let mangler = mangler();
        for name in ToolName::ALL {
            let def = tool_handler(*name, &mangler).definition();
            assert_eq!(def.name, name.as_str());
            assert_eq!(def.input_schema["type"], "object");
        }
    }
}
