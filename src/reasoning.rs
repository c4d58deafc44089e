//! The reasoning step: deciding which tool, if any, a goal calls for.
//!
//! [`RuleBasedReasoner`] is a deterministic stand-in; any [`Reasoner`]
//! can replace it without touching the goal state machine.

use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::goal::{Goal, GoalId};
use crate::tool::{ToolCall, ToolDescription};

/// One {thought, action, observation} record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step: usize,
    pub goal: Option<GoalId>,
    pub thought: String,
    pub action: Option<String>,
    pub observation: Option<String>,
    pub timestamp: SystemTime,
}

impl fmt::Display for ReasoningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thought: {}", self.thought)?;
        if let Some(action) = &self.action {
            write!(f, "\nAction: {action}")?;
        }
        if let Some(observation) = &self.observation {
            write!(f, "\nObservation: {observation}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub thought: String,
    pub call: Option<ToolCall>,
}

impl Decision {
    pub fn act(thought: impl Into<String>, call: ToolCall) -> Self {
        Self {
            thought: thought.into(),
            call: Some(call),
        }
    }

    pub fn no_action(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            call: None,
        }
    }
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Pick at most one tool call for a leaf goal.
    async fn decide(&self, goal: &Goal, tools: &[ToolDescription]) -> Result<Decision>;
}

/// Fixed rules, in order:
/// 1. `"tool"` (and optional `"arguments"`) in goal metadata.
/// 2. Arithmetic phrasing with two numbers, when `calculator` is available.
/// 3. `echo ...` / `say ...`, when `echo` is available.
/// 4. Otherwise no tool.
pub struct RuleBasedReasoner {
    numbers: Regex,
}

impl Default for RuleBasedReasoner {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBasedReasoner {
    pub fn new() -> Self {
        Self {
            numbers: Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern is valid"),
        }
    }

    fn from_metadata(&self, goal: &Goal) -> Option<Decision> {
        let name = goal.metadata().get("tool")?.as_str()?;
        let arguments = goal
            .metadata()
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));
        Some(Decision::act(
            format!("Goal `{}` names tool `{name}` explicitly", goal.description()),
            ToolCall::new(name, arguments),
        ))
    }

    fn arithmetic(&self, description: &str) -> Option<Decision> {
        let lowered = description.to_lowercase();
        let operation = lowered
            .split(|c: char| !c.is_alphanumeric())
            .find_map(|word| match word {
                "sum" | "add" | "plus" | "total" => Some("add"),
                "subtract" | "minus" | "difference" => Some("subtract"),
                "multiply" | "times" | "product" => Some("multiply"),
                "divide" | "quotient" => Some("divide"),
                _ => None,
            })?;

        let numbers: Vec<Value> = self
            .numbers
            .find_iter(&lowered)
            .filter_map(|m| {
                let raw = m.as_str();
                // a hyphen glued to the previous token separates; after a space it is a sign
                let follows_word = lowered[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_alphanumeric() || c == '.');
                match raw.strip_prefix('-') {
                    Some(unsigned) if follows_word => parse_number(unsigned),
                    _ => parse_number(raw),
                }
            })
            .collect();
        let [first, second] = numbers.get(..2)? else {
            return None;
        };
        // "subtract 4 from 10" means 10 - 4
        let (a, b) = if operation == "subtract" && lowered.contains(" from ") {
            (second.clone(), first.clone())
        } else {
            (first.clone(), second.clone())
        };

        Some(Decision::act(
            format!("Goal `{description}` is arithmetic: {operation} {a} and {b}"),
            ToolCall::new("calculator", json!({"operation": operation, "a": a, "b": b})),
        ))
    }

    fn echo(&self, description: &str) -> Option<Decision> {
        let trimmed = description.trim();
        let lowered = trimmed.to_lowercase();
        let prefix = ["echo ", "say "]
            .into_iter()
            .find(|prefix| lowered.starts_with(*prefix))?;
        let message = trimmed.get(prefix.len()..)?.trim();
        Some(Decision::act(
            format!("Goal `{description}` asks to repeat a message"),
            ToolCall::new("echo", json!({ "message": message })),
        ))
    }
}

#[async_trait]
impl Reasoner for RuleBasedReasoner {
    async fn decide(&self, goal: &Goal, tools: &[ToolDescription]) -> Result<Decision> {
        if let Some(decision) = self.from_metadata(goal) {
            return Ok(decision);
        }

        let available = |name: &str| tools.iter().any(|tool| tool.name == name);
        let description = goal.description();

        if available("calculator") {
            if let Some(decision) = self.arithmetic(description) {
                return Ok(decision);
            }
        }
        if available("echo") {
            if let Some(decision) = self.echo(description) {
                return Ok(decision);
            }
        }

        Ok(Decision::no_action(format!(
            "Working on goal: {description}; no registered tool applies"
        )))
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if raw.contains('.') {
        raw.parse::<f64>().ok().map(Value::from)
    } else {
        raw.parse::<i64>()
            .map(Value::from)
            .ok()
            .or_else(|| raw.parse::<f64>().ok().map(Value::from))
    }
}
