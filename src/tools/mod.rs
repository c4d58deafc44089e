//! Built-in tools.
//!
//! - Calculator: two-operand arithmetic
//! - Text: case conversion, reversal and length
//! - Aggregate: sum/avg/min/max over a list of numbers

pub mod aggregate;
pub mod calculator;
pub mod text;

pub use aggregate::AggregateTool;
pub use calculator::CalculatorTool;
pub use text::TextTool;

use serde_json::Value;

use crate::error::{AgentError, Result};

pub(crate) fn require_str<'a>(input: &'a Value, field: &str, tool_name: &str) -> Result<&'a str> {
    input
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(field, tool_name))
}

pub(crate) fn require_number(input: &Value, field: &str, tool_name: &str) -> Result<f64> {
    input
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| missing(field, tool_name))
}

fn missing(field: &str, tool_name: &str) -> AgentError {
    AgentError::InvalidArguments(format!("missing `{field}` for {tool_name}"))
}
