//! Two-operand arithmetic.
//!
//! Integer operands stay integers for add, subtract and multiply so that
//! `10 + 20` yields `30` rather than `30.0`.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{require_number, require_str};
use crate::error::Result;
use crate::tool::{Tool, ToolErrorKind, ToolResult};

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Performs basic arithmetic. Expects {\"operation\": \"add\"|\"subtract\"|\"multiply\"|\"divide\", \"a\": number, \"b\": number}."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "operation": {"type": "string", "enum": ["add", "subtract", "multiply", "divide"]},
                "a": {"type": "number"},
                "b": {"type": "number"}
            },
            "required": ["operation", "a", "b"]
        }))
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult> {
        let operation = require_str(&arguments, "operation", "calculator")?;
        let a = require_number(&arguments, "a", "calculator")?;
        let b = require_number(&arguments, "b", "calculator")?;

        if let (Some(x), Some(y)) = (
            arguments.get("a").and_then(Value::as_i64),
            arguments.get("b").and_then(Value::as_i64),
        ) {
            let exact = match operation {
                "add" => x.checked_add(y),
                "subtract" => x.checked_sub(y),
                "multiply" => x.checked_mul(y),
                _ => None,
            };
            if let Some(result) = exact {
                return Ok(ToolResult::success(result).with_metadata("operation", json!(operation)));
            }
        }

        let result = match operation {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            "divide" => {
                if b == 0.0 {
                    return Ok(ToolResult::failure("Division by zero"));
                }
                a / b
            }
            other => {
                return Ok(ToolResult::failure_with_kind(
                    ToolErrorKind::InvalidArguments,
                    format!("Unknown operation: {other}"),
                ))
            }
        };
        Ok(ToolResult::success(result).with_metadata("operation", json!(operation)))
    }
}
