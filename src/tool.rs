use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};

/// A named capability invoked with a JSON object of named arguments.
///
/// Tools must not keep hidden mutable state between calls. Returning `Err`
/// is allowed; the registry turns it into a failed [`ToolResult`].
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn parameters(&self) -> Option<Value> {
        None
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    NotFound,
    InvalidArguments,
    Execution,
    Timeout,
    Panicked,
}

/// Outcome of a tool invocation.
///
/// A failure never carries output and always carries a non-empty error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    success: bool,
    output: Option<Value>,
    error: Option<String>,
    error_kind: Option<ToolErrorKind>,
    metadata: Map<String, Value>,
}

impl ToolResult {
    pub fn success(output: impl Into<Value>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            error_kind: None,
            metadata: Map::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::failure_with_kind(ToolErrorKind::Execution, error)
    }

    pub fn failure_with_kind(kind: ToolErrorKind, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "tool failed without an error message".into();
        }
        Self {
            success: false,
            output: None,
            error: Some(error),
            error_kind: Some(kind),
            metadata: Map::new(),
        }
    }

    pub fn from_error(err: &AgentError) -> Self {
        let kind = match err {
            AgentError::ToolNotFound(_) => ToolErrorKind::NotFound,
            AgentError::InvalidArguments(_) => ToolErrorKind::InvalidArguments,
            _ => ToolErrorKind::Execution,
        };
        Self::failure_with_kind(kind, err.to_string())
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn into_output(self) -> Option<Value> {
        self.output
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.error_kind
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Short human-readable rendering used for observations and memory.
    pub fn summary(&self) -> String {
        match (&self.output, &self.error) {
            (Some(output), _) => output.to_string(),
            (None, Some(error)) => format!("error: {error}"),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: Option<Value>,
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    timeout: Option<Duration>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every invocation. A zero duration removes the bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Insert under the tool's name; an existing binding is replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_shared(Arc::new(tool));
    }

    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::debug!(tool = %name, "replaced existing tool binding");
        }
    }

    pub fn extend(&mut self, other: ToolRegistry) {
        for tool in other.tools.into_values() {
            self.register_shared(tool);
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn describe(&self) -> Vec<ToolDescription> {
        let mut described: Vec<ToolDescription> = self
            .tools
            .values()
            .map(|tool| ToolDescription {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();
        described.sort_by(|a, b| a.name.cmp(&b.name));
        described
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call. Unknown tools, errors, panics and timeouts all come
    /// back as a failed [`ToolResult`]; this never returns early with an error.
    ///
    /// Requires a tokio runtime with the time driver when a timeout is set.
    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        let tool = match self.get(name) {
            Ok(tool) => tool,
            Err(err) => {
                tracing::warn!(tool = %name, "tool lookup failed");
                return ToolResult::from_error(&err);
            }
        };

        tracing::debug!(tool = %name, %arguments, "invoking tool");
        let call = AssertUnwindSafe(tool.execute(arguments)).catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(tool = %name, ?limit, "tool timed out");
                    return ToolResult::failure_with_kind(
                        ToolErrorKind::Timeout,
                        format!("tool `{name}` timed out after {limit:?}"),
                    );
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(Ok(result)) => {
                if !result.is_success() {
                    tracing::debug!(tool = %name, error = ?result.error(), "tool reported failure");
                }
                result
            }
            Ok(Err(err)) => {
                tracing::warn!(tool = %name, error = %err, "tool returned an error");
                ToolResult::from_error(&err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(tool = %name, %message, "tool panicked");
                ToolResult::failure_with_kind(
                    ToolErrorKind::Panicked,
                    format!("tool `{name}` panicked: {message}"),
                )
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
