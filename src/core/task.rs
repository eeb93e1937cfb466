//! Task and task-plan types.
//!
//! A [`Task`] is one atomic unit of delegated work inside a request's
//! plan; a [`TaskPlan`] is the validated DAG of tasks the coordinator
//! executes. Tasks are immutable after dispatch.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};

/// Capability tag handled by the data analyst agent.
pub const CAP_ANALYSIS: &str = "analysis";

/// Capability tag handled by the report generator agent.
pub const CAP_REPORT: &str = "report";

/// An atomic unit of delegated work.
///
/// Created by the coordinator per request and never mutated after
/// dispatch. The capability tag selects the worker agent through the
/// registry; the dependency set references task IDs within the same plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Plan-unique task identifier.
    pub id: String,

    /// Capability tag selecting the handling agent.
    pub capability: String,

    /// Opaque input payload for the agent.
    pub input: Value,

    /// Task IDs that must complete (`Ok`) before this task dispatches.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Task {
    /// Creates a task with no dependencies.
    #[must_use]
    pub fn new(id: impl Into<String>, capability: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            capability: capability.into(),
            input,
            depends_on: Vec::new(),
        }
    }

    /// Adds a dependency on another task in the same plan.
    #[must_use]
    pub fn depends_on(mut self, task_id: impl Into<String>) -> Self {
        self.depends_on.push(task_id.into());
        self
    }

    /// Returns `true` if the task has no dependencies.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.depends_on.is_empty()
    }
}

/// A validated, ordered plan of tasks.
///
/// Declaration order doubles as the output order: result aggregation
/// follows this order regardless of which task finishes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    tasks: Vec<Task>,
}

impl TaskPlan {
    /// Builds a plan from tasks, validating the dependency graph.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] if the plan is empty, contains duplicate
    /// IDs, references dependencies outside the plan, or has a cycle.
    pub fn new(tasks: Vec<Task>) -> Result<Self, PlanError> {
        if tasks.is_empty() {
            return Err(PlanError::Undecomposable {
                reason: "plan contains no tasks".to_string(),
            });
        }

        let mut ids = HashSet::new();
        for task in &tasks {
            if !ids.insert(task.id.as_str()) {
                return Err(PlanError::DuplicateTask {
                    task_id: task.id.clone(),
                });
            }
        }

        for task in &tasks {
            for dep in &task.depends_on {
                if !ids.contains(dep.as_str()) {
                    return Err(PlanError::UnknownDependency {
                        task_id: task.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        Self::check_acyclic(&tasks)?;

        Ok(Self { tasks })
    }

    /// Kahn's algorithm: every task must be reachable through a
    /// topological ordering, otherwise a cycle exists.
    fn check_acyclic(tasks: &[Task]) -> Result<(), PlanError> {
        let mut in_degree: HashMap<&str, usize> = tasks
            .iter()
            .map(|t| (t.id.as_str(), t.depends_on.len()))
            .collect();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for task in tasks {
            for dep in &task.depends_on {
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(task.id.as_str());
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut visited = 0usize;

        while let Some(id) = queue.pop_front() {
            visited += 1;
            if let Some(next) = dependents.get(id) {
                for dependent in next {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        if visited == tasks.len() {
            Ok(())
        } else {
            let on_cycle = in_degree
                .iter()
                .find(|(_, d)| **d > 0)
                .map_or_else(String::new, |(id, _)| (*id).to_string());
            Err(PlanError::CyclicDependency { task_id: on_cycle })
        }
    }

    /// Tasks in declared output order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by ID.
    #[must_use]
    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// The root task: first dependency-free task in declaration order.
    #[must_use]
    pub fn root(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.is_root())
    }

    /// Number of tasks in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the plan has no tasks (never true for a
    /// validated plan).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// IDs of tasks that transitively depend on `task_id`.
    #[must_use]
    pub fn transitive_dependents(&self, task_id: &str) -> Vec<String> {
        let mut affected: HashSet<&str> = HashSet::new();
        affected.insert(task_id);

        // Declaration order is not guaranteed topological, so iterate
        // until the affected set stops growing.
        loop {
            let before = affected.len();
            for task in &self.tasks {
                if task.depends_on.iter().any(|d| affected.contains(d.as_str())) {
                    affected.insert(task.id.as_str());
                }
            }
            if affected.len() == before {
                break;
            }
        }

        affected.remove(task_id);
        self.tasks
            .iter()
            .filter(|t| affected.contains(t.id.as_str()))
            .map(|t| t.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain_plan() -> TaskPlan {
        TaskPlan::new(vec![
            Task::new("analyze", CAP_ANALYSIS, json!({"query": "q"})),
            Task::new("report", CAP_REPORT, json!({})).depends_on("analyze"),
        ])
        .unwrap()
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new("t1", CAP_ANALYSIS, json!({"a": 1})).depends_on("t0");
        assert_eq!(task.id, "t1");
        assert_eq!(task.capability, CAP_ANALYSIS);
        assert_eq!(task.depends_on, vec!["t0".to_string()]);
        assert!(!task.is_root());
    }

    #[test]
    fn test_plan_valid_chain() {
        let plan = chain_plan();
        assert_eq!(plan.len(), 2);
        assert!(!plan.is_empty());
        assert_eq!(plan.root().map(|t| t.id.as_str()), Some("analyze"));
        assert!(plan.get("report").is_some());
        assert!(plan.get("ghost").is_none());
    }

    #[test]
    fn test_plan_empty_rejected() {
        let result = TaskPlan::new(vec![]);
        assert!(matches!(result, Err(PlanError::Undecomposable { .. })));
    }

    #[test]
    fn test_plan_duplicate_id_rejected() {
        let result = TaskPlan::new(vec![
            Task::new("t", CAP_ANALYSIS, json!({})),
            Task::new("t", CAP_REPORT, json!({})),
        ]);
        assert!(matches!(result, Err(PlanError::DuplicateTask { .. })));
    }

    #[test]
    fn test_plan_unknown_dependency_rejected() {
        let result = TaskPlan::new(vec![
            Task::new("t", CAP_ANALYSIS, json!({})).depends_on("ghost"),
        ]);
        assert!(matches!(
            result,
            Err(PlanError::UnknownDependency { dependency, .. }) if dependency == "ghost"
        ));
    }

    #[test]
    fn test_plan_cycle_rejected() {
        let result = TaskPlan::new(vec![
            Task::new("a", CAP_ANALYSIS, json!({})).depends_on("b"),
            Task::new("b", CAP_REPORT, json!({})).depends_on("a"),
        ]);
        assert!(matches!(result, Err(PlanError::CyclicDependency { .. })));
    }

    #[test]
    fn test_plan_self_cycle_rejected() {
        let result = TaskPlan::new(vec![
            Task::new("a", CAP_ANALYSIS, json!({})).depends_on("a"),
        ]);
        assert!(matches!(result, Err(PlanError::CyclicDependency { .. })));
    }

    #[test]
    fn test_transitive_dependents() {
        let plan = TaskPlan::new(vec![
            Task::new("load", "load", json!({})),
            Task::new("analyze", CAP_ANALYSIS, json!({})).depends_on("load"),
            Task::new("report", CAP_REPORT, json!({})).depends_on("analyze"),
            Task::new("other", CAP_ANALYSIS, json!({})),
        ])
        .unwrap();

        let mut dependents = plan.transitive_dependents("load");
        dependents.sort();
        assert_eq!(dependents, vec!["analyze".to_string(), "report".to_string()]);

        assert!(plan.transitive_dependents("other").is_empty());
    }

    #[test]
    fn test_transitive_dependents_unordered_declaration() {
        // A dependent declared before its dependency must still be found.
        let plan = TaskPlan::new(vec![
            Task::new("report", CAP_REPORT, json!({})).depends_on("analyze"),
            Task::new("analyze", CAP_ANALYSIS, json!({})),
        ])
        .unwrap();
        assert_eq!(
            plan.transitive_dependents("analyze"),
            vec!["report".to_string()]
        );
        // Root is still the first dependency-free task in declaration order.
        assert_eq!(plan.root().map(|t| t.id.as_str()), Some("analyze"));
    }

    #[test]
    fn test_plan_serialization_round_trip() {
        let plan = chain_plan();
        let json = serde_json::to_string(&plan).unwrap();
        let restored: TaskPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, plan);
    }
}
