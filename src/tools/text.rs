use async_trait::async_trait;
use serde_json::{json, Value};

use super::require_str;
use crate::error::Result;
use crate::tool::{Tool, ToolErrorKind, ToolResult};

pub struct TextTool;

#[async_trait]
impl Tool for TextTool {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Performs string operations. Expects {\"operation\": \"upper\"|\"lower\"|\"reverse\"|\"length\", \"text\": string}."
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult> {
        let operation = require_str(&arguments, "operation", "text")?;
        let text = require_str(&arguments, "text", "text")?;

        let output = match operation {
            "upper" => json!(text.to_uppercase()),
            "lower" => json!(text.to_lowercase()),
            "reverse" => json!(text.chars().rev().collect::<String>()),
            "length" => json!(text.chars().count()),
            other => {
                return Ok(ToolResult::failure_with_kind(
                    ToolErrorKind::InvalidArguments,
                    format!("Unknown operation: {other}"),
                ))
            }
        };
        Ok(ToolResult::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transforms_text() {
        let upper = TextTool
            .execute(json!({"operation": "upper", "text": "goal"}))
            .await
            .unwrap();
        assert_eq!(upper.output(), Some(&json!("GOAL")));

        let length = TextTool
            .execute(json!({"operation": "length", "text": "héllo"}))
            .await
            .unwrap();
        assert_eq!(length.output(), Some(&json!(5)));
    }
}
