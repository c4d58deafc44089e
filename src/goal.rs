//! Goal tree and lifecycle state machine.
//!
//! Goals move through `pending -> in_progress -> {completed, failed, blocked}`,
//! and a blocked goal returns to `pending` once every sub-goal has settled.
//! Completed and failed are terminal.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AgentError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(String);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GoalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GoalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Blocked,
}

impl GoalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GoalStatus::Completed | GoalStatus::Failed)
    }

    pub fn can_transition_to(self, next: GoalStatus) -> bool {
        matches!(
            (self, next),
            (GoalStatus::Pending, GoalStatus::InProgress)
                | (GoalStatus::InProgress, GoalStatus::Completed)
                | (GoalStatus::InProgress, GoalStatus::Failed)
                | (GoalStatus::InProgress, GoalStatus::Blocked)
                | (GoalStatus::Blocked, GoalStatus::Pending)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Failed => "failed",
            GoalStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work. A goal exclusively owns its sub-goals.
///
/// Status is read-only from the outside; only [`GoalManager`] moves it.
#[derive(Debug, Clone, Serialize)]
pub struct Goal {
    id: GoalId,
    description: String,
    priority: i32,
    status: GoalStatus,
    sub_goals: Vec<Goal>,
    metadata: Map<String, Value>,
    result: Option<Value>,
    error: Option<String>,
    created_at: SystemTime,
    completed_at: Option<SystemTime>,
    #[serde(skip)]
    sequence: u64,
}

impl Goal {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: GoalId::new(),
            description: description.into(),
            priority: 0,
            status: GoalStatus::Pending,
            sub_goals: Vec::new(),
            metadata: Map::new(),
            result: None,
            error: None,
            created_at: SystemTime::now(),
            completed_at: None,
            sequence: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<GoalId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_sub_goal(mut self, goal: Goal) -> Self {
        self.sub_goals.push(goal);
        self
    }

    /// Attach a sub-goal while the tree is still owned by the caller.
    pub fn add_sub_goal(&mut self, goal: Goal) {
        self.sub_goals.push(goal);
    }

    pub fn id(&self) -> &GoalId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn status(&self) -> GoalStatus {
        self.status
    }

    pub fn sub_goals(&self) -> &[Goal] {
        &self.sub_goals
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<SystemTime> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    pub fn has_sub_goals(&self) -> bool {
        !self.sub_goals.is_empty()
    }

    pub fn all_sub_goals_completed(&self) -> bool {
        self.sub_goals.iter().all(Goal::is_completed)
    }

    /// True when every sub-goal is completed or failed.
    pub fn sub_goals_settled(&self) -> bool {
        self.sub_goals.iter().all(|goal| goal.status.is_terminal())
    }

    pub fn failed_sub_goal(&self) -> Option<&Goal> {
        self.sub_goals
            .iter()
            .find(|goal| goal.status == GoalStatus::Failed)
    }

    /// Depth-first, pre-order walk over this goal and its descendants.
    pub fn walk(&self) -> Vec<&Goal> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Goal>) {
        out.push(self);
        for goal in &self.sub_goals {
            goal.collect(out);
        }
    }

    fn find(&self, id: &GoalId) -> Option<&Goal> {
        if &self.id == id {
            return Some(self);
        }
        self.sub_goals.iter().find_map(|goal| goal.find(id))
    }

    fn find_mut(&mut self, id: &GoalId) -> Option<&mut Goal> {
        if &self.id == id {
            return Some(self);
        }
        self.sub_goals.iter_mut().find_map(|goal| goal.find_mut(id))
    }

    fn transition(&mut self, next: GoalStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AgentError::InvalidTransition {
                goal: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        tracing::debug!(goal = %self.id, from = %self.status, to = %next, "goal transition");
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(SystemTime::now());
        }
        Ok(())
    }

    fn mark_completed(&mut self, result: Option<Value>) -> Result<()> {
        if !self.all_sub_goals_completed() {
            return Err(AgentError::UnsettledSubGoals(self.id.clone()));
        }
        self.transition(GoalStatus::Completed)?;
        self.result = result;
        Ok(())
    }

    fn mark_failed(&mut self, error: String) -> Result<()> {
        self.transition(GoalStatus::Failed)?;
        self.error = Some(error);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GoalCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub blocked: usize,
}

impl GoalCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.failed + self.blocked
    }

    /// Goals that have not been attempted to a settled state yet.
    pub fn remaining(&self) -> usize {
        self.pending + self.in_progress
    }

    fn record(&mut self, status: GoalStatus) {
        match status {
            GoalStatus::Pending => self.pending += 1,
            GoalStatus::InProgress => self.in_progress += 1,
            GoalStatus::Completed => self.completed += 1,
            GoalStatus::Failed => self.failed += 1,
            GoalStatus::Blocked => self.blocked += 1,
        }
    }
}

/// Owns the top-level goals and drives every status change in the tree.
#[derive(Debug, Default, Clone)]
pub struct GoalManager {
    goals: Vec<Goal>,
    ids: HashSet<GoalId>,
    next_sequence: u64,
}

impl GoalManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a top-level goal together with its sub-goal tree.
    pub fn add_goal(&mut self, mut goal: Goal) -> Result<GoalId> {
        self.ensure_unique(&goal)?;
        stamp(&mut goal, &mut self.next_sequence, &mut self.ids);
        let id = goal.id.clone();
        tracing::debug!(goal = %id, priority = goal.priority, "goal added");
        self.goals.push(goal);
        Ok(id)
    }

    /// Decompose an existing goal at runtime. Terminal parents cannot be reopened.
    pub fn add_sub_goal(&mut self, parent: &GoalId, mut goal: Goal) -> Result<GoalId> {
        let parent_status = self.find(parent)?.status;
        if parent_status.is_terminal() {
            return Err(AgentError::InvalidTransition {
                goal: parent.clone(),
                from: parent_status,
                to: GoalStatus::Pending,
            });
        }
        self.ensure_unique(&goal)?;
        stamp(&mut goal, &mut self.next_sequence, &mut self.ids);
        let id = goal.id.clone();
        self.find_mut(parent)?.sub_goals.push(goal);
        tracing::debug!(goal = %id, parent = %parent, "sub-goal added");
        Ok(id)
    }

    pub fn get(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.iter().find_map(|goal| goal.find(id))
    }

    pub fn find(&self, id: &GoalId) -> Result<&Goal> {
        self.get(id)
            .ok_or_else(|| AgentError::GoalNotFound(id.clone()))
    }

    fn find_mut(&mut self, id: &GoalId) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find_map(|goal| goal.find_mut(id))
            .ok_or_else(|| AgentError::GoalNotFound(id.clone()))
    }

    pub fn contains(&self, id: &GoalId) -> bool {
        self.ids.contains(id)
    }

    /// Top-level goals in insertion order.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Every goal in the tree, depth-first.
    pub fn iter(&self) -> impl Iterator<Item = &Goal> + '_ {
        self.goals.iter().flat_map(Goal::walk)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn completed_goals(&self) -> Vec<&Goal> {
        self.iter().filter(|goal| goal.is_completed()).collect()
    }

    pub fn counts(&self) -> GoalCounts {
        let mut counts = GoalCounts::default();
        for goal in self.iter() {
            counts.record(goal.status);
        }
        counts
    }

    /// Highest-priority pending goal; ties go to the earliest inserted.
    ///
    /// Sub-goals are only considered beneath in-progress or blocked parents.
    pub fn next_eligible_goal(&self) -> Option<&Goal> {
        let mut best = None;
        for goal in &self.goals {
            consider(goal, &mut best);
        }
        best
    }

    pub fn start(&mut self, id: &GoalId) -> Result<&Goal> {
        let goal = self.find_mut(id)?;
        goal.transition(GoalStatus::InProgress)?;
        Ok(goal)
    }

    pub fn complete(&mut self, id: &GoalId, result: Option<Value>) -> Result<()> {
        self.find_mut(id)?.mark_completed(result)
    }

    pub fn fail(&mut self, id: &GoalId, error: impl Into<String>) -> Result<()> {
        self.find_mut(id)?.mark_failed(error.into())
    }

    pub fn block(&mut self, id: &GoalId) -> Result<()> {
        self.find_mut(id)?.transition(GoalStatus::Blocked)
    }

    /// Fold sub-goal outcomes into an in-progress parent.
    ///
    /// Any unsettled sub-goal blocks the parent; otherwise a failed sub-goal
    /// fails it and all-completed completes it. Terminal goals are returned
    /// unchanged.
    pub fn settle(&mut self, id: &GoalId) -> Result<GoalStatus> {
        let goal = self.find_mut(id)?;
        if goal.status.is_terminal() {
            return Ok(goal.status);
        }
        if !goal.sub_goals_settled() {
            goal.transition(GoalStatus::Blocked)?;
        } else if let Some(failed) = goal.failed_sub_goal() {
            let error = format!("sub-goal `{}` failed", failed.id);
            goal.mark_failed(error)?;
        } else {
            let results = goal
                .sub_goals
                .iter()
                .map(|sub| sub.result.clone().unwrap_or(Value::Null))
                .collect();
            goal.mark_completed(Some(Value::Array(results)))?;
        }
        Ok(goal.status)
    }

    /// Return blocked goals whose sub-goals have all settled to `pending`.
    pub fn unblock_ready(&mut self) -> Result<Vec<GoalId>> {
        let mut released = Vec::new();
        for goal in &mut self.goals {
            unblock(goal, &mut released)?;
        }
        Ok(released)
    }

    /// Insert without the uniqueness check, to build inconsistent trees in tests.
    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, mut goal: Goal) {
        stamp(&mut goal, &mut self.next_sequence, &mut self.ids);
        self.goals.push(goal);
    }

    fn ensure_unique(&self, goal: &Goal) -> Result<()> {
        let mut seen = HashSet::new();
        for node in goal.walk() {
            if self.ids.contains(&node.id) || !seen.insert(&node.id) {
                return Err(AgentError::DuplicateGoal(node.id.clone()));
            }
        }
        Ok(())
    }
}

fn stamp(goal: &mut Goal, next_sequence: &mut u64, ids: &mut HashSet<GoalId>) {
    goal.sequence = *next_sequence;
    *next_sequence += 1;
    ids.insert(goal.id.clone());
    for sub in &mut goal.sub_goals {
        stamp(sub, next_sequence, ids);
    }
}

fn consider<'a>(goal: &'a Goal, best: &mut Option<&'a Goal>) {
    match goal.status {
        GoalStatus::Pending => {
            let better = match best {
                None => true,
                Some(current) => {
                    (goal.priority, Reverse(goal.sequence))
                        > (current.priority, Reverse(current.sequence))
                }
            };
            if better {
                *best = Some(goal);
            }
        }
        GoalStatus::InProgress | GoalStatus::Blocked => {
            for sub in &goal.sub_goals {
                consider(sub, best);
            }
        }
        GoalStatus::Completed | GoalStatus::Failed => {}
    }
}

fn unblock(goal: &mut Goal, released: &mut Vec<GoalId>) -> Result<()> {
    for sub in &mut goal.sub_goals {
        unblock(sub, released)?;
    }
    if goal.status == GoalStatus::Blocked && goal.sub_goals_settled() {
        goal.transition(GoalStatus::Pending)?;
        released.push(goal.id.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(id: &str, priority: i32) -> Goal {
        Goal::new(format!("goal {id}"))
            .with_id(id)
            .with_priority(priority)
    }

    #[test]
    fn selects_highest_priority_first() {
        let mut manager = GoalManager::new();
        manager.add_goal(leaf("low", 5)).unwrap();
        manager.add_goal(leaf("high", 10)).unwrap();

        let next = manager.next_eligible_goal().unwrap();
        assert_eq!(next.id().as_str(), "high");
        // no mutation in between, same answer
        assert_eq!(manager.next_eligible_goal().unwrap().id().as_str(), "high");
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut manager = GoalManager::new();
        manager.add_goal(leaf("first", 3)).unwrap();
        manager.add_goal(leaf("second", 3)).unwrap();
        manager.add_goal(leaf("third", 3)).unwrap();

        assert_eq!(manager.next_eligible_goal().unwrap().id().as_str(), "first");
        manager.start(&"first".into()).unwrap();
        manager.complete(&"first".into(), None).unwrap();
        assert_eq!(manager.next_eligible_goal().unwrap().id().as_str(), "second");
    }

    #[test]
    fn rejects_duplicate_ids_across_tree() {
        let mut manager = GoalManager::new();
        manager
            .add_goal(leaf("parent", 1).with_sub_goal(leaf("child", 1)))
            .unwrap();

        let err = manager.add_goal(leaf("child", 2)).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateGoal(id) if id.as_str() == "child"));

        let err = manager
            .add_goal(leaf("fresh", 1).with_sub_goal(leaf("twin", 1)).with_sub_goal(leaf("twin", 1)))
            .unwrap_err();
        assert!(matches!(err, AgentError::DuplicateGoal(_)));
        assert!(!manager.contains(&"fresh".into()));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn terminal_states_reject_transitions() {
        let mut manager = GoalManager::new();
        let id = manager.add_goal(leaf("g", 1)).unwrap();
        manager.start(&id).unwrap();
        manager.fail(&id, "boom").unwrap();

        let err = manager.start(&id).unwrap_err();
        assert!(err.is_contract_violation());
        let err = manager.complete(&id, None).unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(manager.find(&id).unwrap().status(), GoalStatus::Failed);
        assert_eq!(manager.find(&id).unwrap().error(), Some("boom"));
    }

    #[test]
    fn pending_goal_cannot_complete_directly() {
        let mut manager = GoalManager::new();
        let id = manager.add_goal(leaf("g", 1)).unwrap();
        let err = manager.complete(&id, None).unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidTransition {
                from: GoalStatus::Pending,
                to: GoalStatus::Completed,
                ..
            }
        ));
    }

    #[test]
    fn parent_blocks_until_children_settle() {
        let mut manager = GoalManager::new();
        let parent = manager
            .add_goal(
                leaf("parent", 10)
                    .with_sub_goal(leaf("a", 1))
                    .with_sub_goal(leaf("b", 2)),
            )
            .unwrap();

        assert_eq!(manager.next_eligible_goal().unwrap().id(), &parent);
        manager.start(&parent).unwrap();
        assert_eq!(manager.settle(&parent).unwrap(), GoalStatus::Blocked);

        // children become eligible beneath the blocked parent, by priority
        assert_eq!(manager.next_eligible_goal().unwrap().id().as_str(), "b");
        for id in ["b", "a"] {
            let id = GoalId::from(id);
            manager.start(&id).unwrap();
            manager.complete(&id, Some(json!(id.as_str()))).unwrap();
        }

        assert_eq!(manager.unblock_ready().unwrap(), vec![parent.clone()]);
        assert_eq!(manager.next_eligible_goal().unwrap().id(), &parent);
        manager.start(&parent).unwrap();
        assert_eq!(manager.settle(&parent).unwrap(), GoalStatus::Completed);
        assert_eq!(
            manager.find(&parent).unwrap().result(),
            Some(&json!(["a", "b"]))
        );
        assert!(manager.next_eligible_goal().is_none());
    }

    #[test]
    fn failed_child_fails_parent_and_settle_is_idempotent() {
        let mut manager = GoalManager::new();
        let parent = manager
            .add_goal(
                leaf("parent", 1)
                    .with_sub_goal(leaf("ok", 1))
                    .with_sub_goal(leaf("bad", 1)),
            )
            .unwrap();
        manager.start(&parent).unwrap();
        manager.settle(&parent).unwrap();

        manager.start(&"ok".into()).unwrap();
        manager.complete(&"ok".into(), None).unwrap();
        manager.start(&"bad".into()).unwrap();
        manager.fail(&"bad".into(), "nope").unwrap();
        manager.unblock_ready().unwrap();

        manager.start(&parent).unwrap();
        assert_eq!(manager.settle(&parent).unwrap(), GoalStatus::Failed);
        assert_eq!(manager.settle(&parent).unwrap(), GoalStatus::Failed);
        assert_eq!(
            manager.find(&parent).unwrap().error(),
            Some("sub-goal `bad` failed")
        );
    }

    #[test]
    fn parent_with_open_children_cannot_complete() {
        let mut manager = GoalManager::new();
        let parent = manager
            .add_goal(leaf("parent", 1).with_sub_goal(leaf("child", 1)))
            .unwrap();
        manager.start(&parent).unwrap();
        let err = manager.complete(&parent, None).unwrap_err();
        assert!(matches!(err, AgentError::UnsettledSubGoals(_)));
    }

    #[test]
    fn runtime_decomposition_and_counts() {
        let mut manager = GoalManager::new();
        let parent = manager.add_goal(leaf("parent", 1)).unwrap();
        manager.add_sub_goal(&parent, leaf("late", 1)).unwrap();

        let counts = manager.counts();
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.total(), 2);
        assert_eq!(manager.iter().count(), 2);

        let missing = manager.add_sub_goal(&"ghost".into(), leaf("x", 1));
        assert!(missing.unwrap_err().is_not_found());
    }
}
