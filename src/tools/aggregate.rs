use async_trait::async_trait;
use serde_json::{json, Value};

use super::require_str;
use crate::error::{AgentError, Result};
use crate::tool::{Tool, ToolErrorKind, ToolResult};

pub struct AggregateTool;

#[async_trait]
impl Tool for AggregateTool {
    fn name(&self) -> &str {
        "aggregate"
    }

    fn description(&self) -> &str {
        "Aggregates a list of numbers. Expects {\"operation\": \"sum\"|\"avg\"|\"min\"|\"max\", \"numbers\": [number]}."
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult> {
        let operation = require_str(&arguments, "operation", "aggregate")?;
        let numbers = arguments
            .get("numbers")
            .and_then(Value::as_array)
            .ok_or_else(|| AgentError::InvalidArguments("missing `numbers` for aggregate".into()))?
            .iter()
            .map(|value| {
                value.as_f64().ok_or_else(|| {
                    AgentError::InvalidArguments(format!("non-numeric entry `{value}` in `numbers`"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if numbers.is_empty() {
            return Ok(ToolResult::failure("Empty list provided"));
        }

        let result = match operation {
            "sum" => numbers.iter().sum::<f64>(),
            "avg" => numbers.iter().sum::<f64>() / numbers.len() as f64,
            "min" => numbers.iter().copied().fold(f64::INFINITY, f64::min),
            "max" => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            other => {
                return Ok(ToolResult::failure_with_kind(
                    ToolErrorKind::InvalidArguments,
                    format!("Unknown operation: {other}"),
                ))
            }
        };
        Ok(ToolResult::success(json!(result)).with_metadata("count", json!(numbers.len())))
    }
}
