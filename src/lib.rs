//! Building blocks for an autonomous, goal-driven agent.
//!
//! The crate provides:
//! - A goal tree with an explicit lifecycle and priority selection (`GoalManager`).
//! - A tool interface with failure-isolating dispatch (`Tool` and `ToolRegistry`).
//! - Two-tier memory with FIFO eviction and importance-based promotion (`Memory`).
//! - An `Agent` that loops over goals, consulting a pluggable `Reasoner`.

mod agent;
mod config;
mod error;
mod goal;
mod hooks;
mod logging;
mod memory;
mod metrics;
mod reasoning;
mod tool;
mod toolkit;
pub mod tools;

pub use agent::{Agent, AgentStatus, RunSummary, StopHandle, StopReason};
pub use config::{AgentConfig, AppConfig, LoggingConfig};
pub use error::{AgentError, Result};
pub use goal::{Goal, GoalCounts, GoalId, GoalManager, GoalStatus};
pub use hooks::AgentHook;
pub use logging::init_logging;
pub use memory::{
    Memory, MemoryEntry, MemoryScope, DEFAULT_PROMOTION_THRESHOLD, DEFAULT_SHORT_TERM_CAPACITY,
    MAX_IMPORTANCE,
};
pub use metrics::{EvaluationReport, MetricsTracker, RunGuard};
pub use reasoning::{Decision, Reasoner, ReasoningStep, RuleBasedReasoner};
pub use tool::{Tool, ToolCall, ToolDescription, ToolErrorKind, ToolRegistry, ToolResult};
pub use toolkit::{basic_toolkit, extended_toolkit, EchoTool};
