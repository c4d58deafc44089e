use async_trait::async_trait;

use crate::goal::Goal;
use crate::tool::{ToolCall, ToolResult};

/// Observer for the run loop. Hooks see each step but cannot abort it.
#[async_trait]
pub trait AgentHook: Send + Sync {
    async fn on_goal_selected(&self, _goal: &Goal) {}

    async fn before_tool_call(&self, _goal: &Goal, _call: &ToolCall) {}

    async fn after_tool_result(&self, _goal: &Goal, _result: &ToolResult) {}

    async fn on_goal_finished(&self, _goal: &Goal) {}
}
