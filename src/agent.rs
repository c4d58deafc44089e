use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::goal::{Goal, GoalCounts, GoalId, GoalManager, GoalStatus};
use crate::hooks::AgentHook;
use crate::memory::{Memory, MAX_IMPORTANCE};
use crate::metrics::{MetricsTracker, RunGuard};
use crate::reasoning::{Reasoner, ReasoningStep, RuleBasedReasoner};
use crate::tool::{panic_message, Tool, ToolRegistry, ToolResult};
use crate::toolkit::basic_toolkit;

const TOOL_MEMORY_IMPORTANCE: u8 = 5;
const COMPLETED_GOAL_IMPORTANCE: u8 = 8;
const FAILED_GOAL_IMPORTANCE: u8 = 7;

/// Cooperative stop signal checked before every iteration of [`Agent::run`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No pending goal is left anywhere in the tree.
    Exhausted,
    /// The iteration budget ran out; not an error.
    IterationBudget,
    /// A [`StopHandle`] was triggered.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub iterations: usize,
    pub completed: usize,
    pub failed: usize,
    pub blocked: usize,
    pub remaining: usize,
    pub total: usize,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub goals: GoalCounts,
    pub total_goals: usize,
    pub short_term_memories: usize,
    pub long_term_memories: usize,
    pub tools: Vec<String>,
    pub reasoning_steps: usize,
}

/// Orchestrates goals, tools and memory.
///
/// Each iteration selects the next eligible goal, reasons about it, performs
/// at most one tool call, and folds the outcome into goal state and memory.
/// Per-goal failures are data; only state machine violations abort a run.
pub struct Agent {
    name: String,
    config: AgentConfig,
    goals: GoalManager,
    tools: ToolRegistry,
    memory: Memory,
    reasoner: Arc<dyn Reasoner>,
    history: Vec<ReasoningStep>,
    hooks: Vec<Arc<dyn AgentHook>>,
    metrics: Option<MetricsTracker>,
    stop: StopHandle,
}

impl Agent {
    /// An agent with the `echo` and `calculator` tools registered.
    pub fn new(config: AgentConfig) -> Self {
        let mut agent = Self::without_default_tools(config);
        agent.tools.extend(basic_toolkit());
        agent
    }

    pub fn without_default_tools(config: AgentConfig) -> Self {
        let memory = Memory::new(config.max_short_term_memory)
            .with_promotion_threshold(config.promotion_threshold);
        let tools = ToolRegistry::new().with_timeout(config.tool_timeout());
        Self {
            name: "AutoGoal".to_string(),
            config,
            goals: GoalManager::new(),
            tools,
            memory,
            reasoner: Arc::new(RuleBasedReasoner::new()),
            history: Vec::new(),
            hooks: Vec::new(),
            metrics: None,
            stop: StopHandle::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the registry wholesale; the configured timeout still applies.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools.with_timeout(self.config.tool_timeout());
        self
    }

    pub fn with_reasoner(mut self, reasoner: Arc<dyn Reasoner>) -> Self {
        self.reasoner = reasoner;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn AgentHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsTracker) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn goals(&self) -> &GoalManager {
        &self.goals
    }

    pub fn goal(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.get(id)
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn reasoning_history(&self) -> &[ReasoningStep] {
        &self.history
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn add_goal(&mut self, goal: Goal) -> Result<GoalId> {
        let description = format!("New goal added: {}", goal.description());
        let importance = clamp_importance(goal.priority());
        let id = self.goals.add_goal(goal)?;
        self.memory.add_to_short_term(description, importance, ["goal"]);
        Ok(id)
    }

    pub fn add_sub_goal(&mut self, parent: &GoalId, goal: Goal) -> Result<GoalId> {
        let description = format!("New sub-goal added: {}", goal.description());
        let importance = clamp_importance(goal.priority());
        let id = self.goals.add_sub_goal(parent, goal)?;
        self.memory
            .add_to_short_term(description, importance, ["goal", "sub_goal"]);
        Ok(id)
    }

    pub fn add_tool<T: Tool + 'static>(&mut self, tool: T) {
        let note = format!("New tool available: {} - {}", tool.name(), tool.description());
        self.tools.register(tool);
        self.memory
            .add_to_short_term(note, TOOL_MEMORY_IMPORTANCE, ["tool"]);
    }

    /// Summarise what the agent currently knows. Read-only.
    pub fn think(&self, context: &str) -> String {
        let mut thought = format!("Analyzing context: {context}");
        let tools = self.tools.names();
        if !tools.is_empty() {
            thought.push_str(&format!("\nAvailable tools: {}", tools.join(", ")));
        }
        if let Some(goal) = self.goals.next_eligible_goal() {
            thought.push_str(&format!("\nNext goal to work on: {}", goal.description()));
        }
        if self.memory.short_term_len() > 0 {
            thought.push_str(&format!(
                "\nRecent context from memory: {} items",
                self.memory.short_term_len()
            ));
        }
        thought
    }

    /// Invoke a tool outside the goal loop.
    pub async fn execute_tool(&mut self, name: &str, arguments: Value) -> ToolResult {
        let action = format!("{name}({arguments})");
        let result = self.tools.invoke(name, arguments).await;
        self.remember_tool_result(name, &result);
        self.record_step(
            None,
            format!("Using tool {name}"),
            Some(action),
            Some(result.summary()),
        );
        result
    }

    /// Run one goal from `pending` to a terminal or blocked state.
    pub async fn execute_goal(&mut self, id: &GoalId) -> Result<GoalStatus> {
        self.execute(id, None).await
    }

    pub async fn run(&mut self, max_iterations: usize) -> Result<RunSummary> {
        let mut guard = self.metrics.as_ref().map(MetricsTracker::start_run);
        let mut iterations = 0;

        let stop_reason = loop {
            if self.stop.take() {
                break StopReason::Stopped;
            }
            let Some(next) = self.goals.next_eligible_goal().map(|goal| goal.id().clone()) else {
                break StopReason::Exhausted;
            };
            if iterations >= max_iterations {
                break StopReason::IterationBudget;
            }

            if let Err(err) = self.execute(&next, guard.as_mut()).await {
                tracing::error!(goal = %next, error = %err, "run aborted");
                if let Some(guard) = guard {
                    guard.finish(false);
                }
                return Err(err);
            }
            iterations += 1;
            if let Some(guard) = guard.as_mut() {
                guard.record_iteration();
            }
        };

        let counts = self.goals.counts();
        let summary = RunSummary {
            iterations,
            completed: counts.completed,
            failed: counts.failed,
            blocked: counts.blocked,
            remaining: counts.remaining(),
            total: counts.total(),
            stop_reason,
        };
        tracing::info!(
            iterations,
            completed = summary.completed,
            failed = summary.failed,
            remaining = summary.remaining,
            reason = ?stop_reason,
            "run finished"
        );
        if let Some(guard) = guard {
            guard.finish(summary.failed == 0);
        }
        Ok(summary)
    }

    /// Run with the configured `max_iterations`.
    pub async fn run_configured(&mut self) -> Result<RunSummary> {
        self.run(self.config.max_iterations).await
    }

    pub fn get_status(&self) -> AgentStatus {
        let goals = self.goals.counts();
        AgentStatus {
            name: self.name.clone(),
            total_goals: goals.total(),
            goals,
            short_term_memories: self.memory.short_term_len(),
            long_term_memories: self.memory.long_term_len(),
            tools: self.tools.names(),
            reasoning_steps: self.history.len(),
        }
    }

    async fn execute(&mut self, id: &GoalId, guard: Option<&mut RunGuard>) -> Result<GoalStatus> {
        let goal = self.goals.start(id)?.clone();
        tracing::info!(goal = %id, priority = goal.priority(), description = goal.description(), "executing goal");
        for hook in &self.hooks {
            notify("on_goal_selected", hook.on_goal_selected(&goal)).await;
        }

        let (thought, action, observation) = if goal.has_sub_goals() {
            let status = self.goals.settle(id)?;
            (
                format!(
                    "Coordinating {} sub-goals of: {}",
                    goal.sub_goals().len(),
                    goal.description()
                ),
                None,
                format!("goal is {status}"),
            )
        } else {
            self.execute_leaf(&goal, guard).await?
        };

        let finished = self.goals.find(id)?.clone();
        self.record_step(Some(id.clone()), thought, action, Some(observation));
        if finished.status().is_terminal() {
            self.remember_outcome(&finished);
            for hook in &self.hooks {
                notify("on_goal_finished", hook.on_goal_finished(&finished)).await;
            }
        }

        for released in self.goals.unblock_ready()? {
            tracing::debug!(goal = %released, "sub-goals settled, goal pending again");
        }
        Ok(finished.status())
    }

    async fn execute_leaf(
        &mut self,
        goal: &Goal,
        guard: Option<&mut RunGuard>,
    ) -> Result<(String, Option<String>, String)> {
        let id = goal.id();
        let decision = match self.reasoner.decide(goal, &self.tools.describe()).await {
            Ok(decision) => decision,
            Err(err) => {
                tracing::warn!(goal = %id, error = %err, "reasoning failed");
                self.goals.fail(id, err.to_string())?;
                return Ok((
                    format!("Working on goal: {}", goal.description()),
                    None,
                    format!("reasoning failed: {err}"),
                ));
            }
        };

        let Some(call) = decision.call else {
            self.goals.complete(id, None)?;
            return Ok((
                decision.thought,
                None,
                "no tool required; goal completed".to_string(),
            ));
        };

        let action = format!("{}({})", call.name, call.arguments);
        for hook in &self.hooks {
            notify("before_tool_call", hook.before_tool_call(goal, &call)).await;
        }
        let result = self.tools.invoke(&call.name, call.arguments.clone()).await;
        if let Some(guard) = guard {
            guard.record_tool_call(call.name.as_str());
            if !result.is_success() {
                guard.record_failure();
            }
        }
        for hook in &self.hooks {
            notify("after_tool_result", hook.after_tool_result(goal, &result)).await;
        }
        self.remember_tool_result(&call.name, &result);

        let observation = result.summary();
        if result.is_success() {
            self.goals.complete(id, result.into_output())?;
        } else {
            let error = result.error().unwrap_or("tool failed").to_string();
            self.goals.fail(id, error)?;
        }
        Ok((decision.thought, Some(action), observation))
    }

    fn record_step(
        &mut self,
        goal: Option<GoalId>,
        thought: String,
        action: Option<String>,
        observation: Option<String>,
    ) {
        if !self.config.enable_reasoning_history {
            return;
        }
        self.history.push(ReasoningStep {
            step: self.history.len() + 1,
            goal,
            thought,
            action,
            observation,
            timestamp: SystemTime::now(),
        });
    }

    fn remember_tool_result(&mut self, name: &str, result: &ToolResult) {
        self.memory.add_to_short_term(
            format!("Executed tool '{name}' with result: {}", result.summary()),
            TOOL_MEMORY_IMPORTANCE,
            ["action", "tool", name],
        );
    }

    fn remember_outcome(&mut self, goal: &Goal) {
        match goal.status() {
            GoalStatus::Completed => {
                self.memory.add_to_short_term(
                    format!("Completed goal: {}", goal.description()),
                    COMPLETED_GOAL_IMPORTANCE,
                    ["goal", "completed"],
                );
            }
            GoalStatus::Failed => {
                self.memory.add_to_short_term(
                    format!(
                        "Failed goal: {} ({})",
                        goal.description(),
                        goal.error().unwrap_or("unknown error")
                    ),
                    FAILED_GOAL_IMPORTANCE,
                    ["goal", "failed"],
                );
            }
            _ => {}
        }
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

/// Await a hook callback; a panicking hook is logged and skipped.
async fn notify(hook: &str, event: impl Future<Output = ()>) {
    if let Err(payload) = AssertUnwindSafe(event).catch_unwind().await {
        let message = panic_message(payload.as_ref());
        tracing::warn!(hook, %message, "hook panicked");
    }
}

fn clamp_importance(priority: i32) -> u8 {
    priority.clamp(0, i32::from(MAX_IMPORTANCE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::AgentError;
    use crate::reasoning::Decision;
    use crate::tool::{ToolDescription, ToolErrorKind};

    fn leaf(id: &str, description: &str, priority: i32) -> Goal {
        Goal::new(description).with_id(id).with_priority(priority)
    }

    #[tokio::test]
    async fn completes_arithmetic_goal_with_one_step() {
        let mut agent = Agent::default();
        let id = agent.add_goal(Goal::new("sum 10 and 20").with_priority(10)).unwrap();

        let summary = agent.run(5).await.unwrap();

        let goal = agent.goal(&id).unwrap();
        assert_eq!(goal.status(), GoalStatus::Completed);
        assert_eq!(goal.result(), Some(&json!(30)));
        assert_eq!(agent.reasoning_history().len(), 1);
        assert_eq!(agent.reasoning_history()[0].observation.as_deref(), Some("30"));
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.stop_reason, StopReason::Exhausted);
    }

    #[tokio::test]
    async fn iteration_budget_leaves_remaining_goals_pending() {
        let mut agent = Agent::default();
        agent.add_goal(leaf("a", "first", 1)).unwrap();
        agent.add_goal(leaf("b", "second", 1)).unwrap();

        let summary = agent.run(1).await.unwrap();

        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.completed + summary.failed, 1);
        assert_eq!(summary.remaining, 1);
        assert_eq!(summary.stop_reason, StopReason::IterationBudget);
        assert_eq!(agent.goal(&"a".into()).unwrap().status(), GoalStatus::Completed);
        assert_eq!(agent.goal(&"b".into()).unwrap().status(), GoalStatus::Pending);
    }

    #[tokio::test]
    async fn tool_failure_fails_goal_but_not_run() {
        let mut agent = Agent::default();
        agent
            .add_goal(leaf("bad", "call a ghost", 9).with_metadata("tool", json!("ghost")))
            .unwrap();
        agent.add_goal(leaf("div", "divide 1 by 0", 8)).unwrap();
        agent.add_goal(leaf("ok", "sum 1 and 2", 1)).unwrap();

        let summary = agent.run(10).await.unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.completed, 1);
        let bad = agent.goal(&"bad".into()).unwrap();
        assert_eq!(bad.status(), GoalStatus::Failed);
        assert!(bad.error().unwrap().contains("not found"));
        assert!(bad.result().is_none());
        assert_eq!(agent.goal(&"div".into()).unwrap().error(), Some("Division by zero"));
        assert_eq!(agent.memory().search_by_tag("failed").len(), 2);
    }

    #[tokio::test]
    async fn hierarchical_goal_folds_sub_goal_results() {
        let mut agent = Agent::default();
        let parent = agent
            .add_goal(
                leaf("plan", "Plan and execute a calculation", 10)
                    .with_sub_goal(leaf("s1", "add 5 and 3", 8))
                    .with_sub_goal(leaf("s2", "multiply 8 by 2", 7))
                    .with_sub_goal(leaf("s3", "subtract 4 from 16", 6)),
            )
            .unwrap();

        let summary = agent.run(20).await.unwrap();

        assert_eq!(summary.iterations, 5);
        assert_eq!(summary.completed, 4);
        let goal = agent.goal(&parent).unwrap();
        assert_eq!(goal.status(), GoalStatus::Completed);
        assert_eq!(goal.result(), Some(&json!([8, 16, 12])));

        let order: Vec<_> = agent
            .reasoning_history()
            .iter()
            .filter_map(|step| step.goal.as_ref().map(GoalId::to_string))
            .collect();
        assert_eq!(order, vec!["plan", "s1", "s2", "s3", "plan"]);
    }

    #[tokio::test]
    async fn failed_sub_goal_fails_parent() {
        let mut agent = Agent::default();
        agent
            .add_goal(
                leaf("parent", "parent", 1)
                    .with_sub_goal(leaf("good", "sum 1 and 1", 1))
                    .with_sub_goal(leaf("broken", "divide 1 by 0", 1)),
            )
            .unwrap();

        let summary = agent.run(10).await.unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(
            agent.goal(&"parent".into()).unwrap().status(),
            GoalStatus::Failed
        );
    }

    #[tokio::test]
    async fn executing_a_finished_goal_is_a_contract_violation() {
        let mut agent = Agent::default();
        let id = agent.add_goal(Goal::new("echo hi")).unwrap();

        assert_eq!(agent.execute_goal(&id).await.unwrap(), GoalStatus::Completed);
        let err = agent.execute_goal(&id).await.unwrap_err();
        assert!(err.is_contract_violation());

        let err = agent.execute_goal(&"nope".into()).await.unwrap_err();
        assert!(matches!(err, AgentError::GoalNotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_goal_is_rejected() {
        let mut agent = Agent::default();
        agent.add_goal(leaf("same", "one", 1)).unwrap();
        let err = agent.add_goal(leaf("same", "two", 1)).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateGoal(_)));
        assert_eq!(agent.get_status().total_goals, 1);
    }

    #[tokio::test]
    async fn history_can_be_disabled() {
        let mut agent = Agent::new(AgentConfig::default().with_reasoning_history(false));
        agent.add_goal(Goal::new("sum 2 and 2")).unwrap();
        agent.run(5).await.unwrap();
        assert!(agent.reasoning_history().is_empty());
    }

    struct FailingReasoner;

    #[async_trait]
    impl Reasoner for FailingReasoner {
        async fn decide(&self, _goal: &Goal, _tools: &[ToolDescription]) -> Result<Decision> {
            Err(AgentError::Reasoning("backend offline".into()))
        }
    }

    #[tokio::test]
    async fn reasoning_error_fails_the_goal() {
        let mut agent = Agent::default().with_reasoner(Arc::new(FailingReasoner));
        let id = agent.add_goal(Goal::new("anything")).unwrap();

        let status = agent.execute_goal(&id).await.unwrap();

        assert_eq!(status, GoalStatus::Failed);
        assert!(agent.goal(&id).unwrap().error().unwrap().contains("backend offline"));
        assert_eq!(agent.reasoning_history().len(), 1);
    }

    struct StopAfterFirst(StopHandle);

    #[async_trait]
    impl AgentHook for StopAfterFirst {
        async fn on_goal_finished(&self, _goal: &Goal) {
            self.0.stop();
        }
    }

    #[tokio::test]
    async fn stop_handle_ends_run_early() {
        let mut agent = Agent::default();
        let handle = agent.stop_handle();
        agent = agent.with_hook(Arc::new(StopAfterFirst(handle.clone())));
        for i in 0..3 {
            agent.add_goal(Goal::new(format!("goal {i}"))).unwrap();
        }

        let summary = agent.run(10).await.unwrap();

        assert_eq!(summary.stop_reason, StopReason::Stopped);
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.remaining, 2);
        assert!(!handle.is_stopped());
    }

    #[tokio::test]
    async fn status_snapshot_and_direct_tool_use() {
        let mut agent = Agent::new(AgentConfig::default().with_max_short_term_memory(3))
            .with_name("Tester");
        agent.add_goal(Goal::new("Plan the release").with_priority(3)).unwrap();

        let result = agent.execute_tool("echo", json!({"message": "Hello"})).await;
        assert_eq!(result.output(), Some(&json!("Hello")));
        let missing = agent.execute_tool("nonexistent", json!({})).await;
        assert_eq!(missing.error_kind(), Some(ToolErrorKind::NotFound));

        let thought = agent.think("Current context");
        assert!(thought.contains("Analyzing context"));
        assert!(thought.contains("Plan the release"));

        let status = agent.get_status();
        assert_eq!(status.name, "Tester");
        assert_eq!(status.goals.pending, 1);
        assert_eq!(status.tools, vec!["calculator", "echo"]);
        assert_eq!(status.reasoning_steps, 2);
        assert_eq!(status.short_term_memories, 3);
        assert_eq!(agent.get_status(), status);
    }

    #[tokio::test]
    async fn runtime_decomposition_blocks_parent() {
        let mut agent = Agent::default();
        let parent = agent.add_goal(leaf("p", "ship it", 5)).unwrap();
        agent.add_sub_goal(&parent, leaf("c", "sum 3 and 4", 1)).unwrap();

        assert_eq!(agent.execute_goal(&parent).await.unwrap(), GoalStatus::Blocked);
        let summary = agent.run(10).await.unwrap();
        assert_eq!(summary.iterations, 2);
        assert_eq!(agent.goal(&parent).unwrap().result(), Some(&json!([7])));
    }

    #[tokio::test]
    async fn run_surfaces_contract_violations() {
        let metrics = MetricsTracker::default();
        let mut agent = Agent::default().with_metrics(metrics.clone());
        let id = agent.add_goal(leaf("x", "echo first", 1)).unwrap();
        agent.execute_goal(&id).await.unwrap();
        // a second pending goal sharing the id resolves to the completed one
        agent.goals.insert_unchecked(leaf("x", "echo second", 5));

        let err = agent.run(10).await.unwrap_err();

        assert!(err.is_contract_violation());
        assert!(matches!(
            err,
            AgentError::InvalidTransition {
                from: GoalStatus::Completed,
                to: GoalStatus::InProgress,
                ..
            }
        ));
        let reports = metrics.reports();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].success);
        assert_eq!(reports[0].iterations, 0);
    }

    struct PanickingHook;

    #[async_trait]
    impl AgentHook for PanickingHook {
        async fn on_goal_selected(&self, _goal: &Goal) {
            panic!("selected");
        }

        async fn after_tool_result(&self, _goal: &Goal, _result: &ToolResult) {
            panic!("after");
        }

        async fn on_goal_finished(&self, _goal: &Goal) {
            panic!("finished");
        }
    }

    #[tokio::test]
    async fn panicking_hook_does_not_stop_the_loop() {
        let mut agent = Agent::default().with_hook(Arc::new(PanickingHook));
        let sum = agent.add_goal(leaf("sum", "sum 4 and 5", 2)).unwrap();
        let idle = agent.add_goal(leaf("idle", "think quietly", 1)).unwrap();

        let summary = agent.run(10).await.unwrap();

        assert_eq!(summary.completed, 2);
        assert_eq!(summary.stop_reason, StopReason::Exhausted);
        assert_eq!(agent.goal(&sum).unwrap().result(), Some(&json!(9)));
        assert_eq!(agent.goal(&idle).unwrap().status(), GoalStatus::Completed);
    }
}
