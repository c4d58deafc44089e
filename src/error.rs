use thiserror::Error;

use crate::goal::{GoalId, GoalStatus};

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("tool `{0}` not found")]
    ToolNotFound(String),

    #[error("goal `{0}` not found")]
    GoalNotFound(GoalId),

    #[error("goal `{0}` already exists")]
    DuplicateGoal(GoalId),

    #[error("tool `{name}` execution failed: {source}")]
    ToolExecution {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("illegal transition for goal `{goal}`: {from} -> {to}")]
    InvalidTransition {
        goal: GoalId,
        from: GoalStatus,
        to: GoalStatus,
    },

    #[error("goal `{0}` cannot complete while sub-goals are unsettled")]
    UnsettledSubGoals(GoalId),

    #[error("reasoning error: {0}")]
    Reasoning(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl AgentError {
    /// State machine breaches are programming errors and abort a run.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AgentError::InvalidTransition { .. } | AgentError::UnsettledSubGoals(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AgentError::ToolNotFound(_) | AgentError::GoalNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_contract_violations() {
        let err = AgentError::InvalidTransition {
            goal: GoalId::from("g-1"),
            from: GoalStatus::Completed,
            to: GoalStatus::Pending,
        };
        assert!(err.is_contract_violation());
        assert_eq!(
            err.to_string(),
            "illegal transition for goal `g-1`: completed -> pending"
        );

        let err = AgentError::ToolNotFound("missing".into());
        assert!(!err.is_contract_violation());
        assert!(err.is_not_found());
    }
}
