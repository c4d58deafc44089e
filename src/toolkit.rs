use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;
use crate::tool::{Tool, ToolRegistry, ToolResult};
use crate::tools::{AggregateTool, CalculatorTool, TextTool};

/// Tools every agent starts with: `echo` and `calculator`.
pub fn basic_toolkit() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool);
    registry.register(CalculatorTool);
    registry
}

/// The basic toolkit plus `text` and `aggregate`.
pub fn extended_toolkit() -> ToolRegistry {
    let mut registry = basic_toolkit();
    registry.register(TextTool);
    registry.register(AggregateTool);
    registry
}

pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes back the provided message. Expects {\"message\": string}."
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult> {
        let message = match arguments.get("message") {
            Some(Value::String(text)) => json!(text),
            Some(other) => other.clone(),
            None => json!(""),
        };
        Ok(ToolResult::success(message))
    }
}
