//! Project and schedule validation.
//!
//! Project checks run before a model is built. They detect:
//! - Non-positive horizon
//! - Successor references to undeclared tasks
//! - Single-task demand above a resource's capacity (definite infeasibility)
//! - Circular precedence (DAG validation)
//!
//! Schedule checks verify a solved schedule against the project:
//! durations, precedence, cumulative capacity and horizon bounds.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use crate::error::ModelError;
use crate::models::{ProjectDescription, ScheduleAssignment, TaskId, Violation, ViolationType};

/// Validation result: all detected problems, in discovery order.
pub type ValidationResult<E> = Result<(), Vec<E>>;

/// Validates a project for model construction.
///
/// Checks:
/// 1. Horizon is positive
/// 2. Every successor refers to a declared task
/// 3. No task demands more of a resource than its capacity
/// 4. No circular precedence
///
/// Resources that are undeclared or declared with capacity 0 impose no
/// limit and are not checked.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_project(project: &ProjectDescription) -> ValidationResult<ModelError> {
    let mut errors = Vec::new();

    if project.horizon() <= 0 {
        errors.push(ModelError::NonPositiveHorizon(project.horizon()));
    }

    for task in project.tasks() {
        for &successor in &task.successors {
            if project.task(successor).is_none() {
                errors.push(ModelError::UnknownSuccessor {
                    task: task.id,
                    successor,
                });
            }
        }
    }

    for resource in project.resources().iter().filter(|r| r.is_active()) {
        for task in project.tasks() {
            let demand = task.demand(&resource.id);
            if demand > resource.capacity {
                errors.push(ModelError::DemandExceedsCapacity {
                    task: task.id,
                    resource: resource.id.clone(),
                    demand,
                    capacity: resource.capacity,
                });
            }
        }
    }

    if let Some(task) = detect_cycle(project) {
        errors.push(ModelError::CyclicPrecedence(task));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects a cycle in the successor graph using DFS.
///
/// Returns a task on the cycle. Successors that are not declared tasks
/// are ignored here; they are reported separately. The walk keeps an
/// explicit stack, so chain length is bounded by memory, not call depth.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
fn detect_cycle(project: &ProjectDescription) -> Option<TaskId> {
    let adj: HashMap<TaskId, &[TaskId]> = project
        .tasks()
        .iter()
        .map(|t| (t.id, t.successors.as_slice()))
        .collect();

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();
    // (task, index of the next successor to explore)
    let mut stack: Vec<(TaskId, usize)> = Vec::new();

    for task in project.tasks() {
        if !visited.insert(task.id) {
            continue;
        }
        in_stack.insert(task.id);
        stack.push((task.id, 0));

        while let Some(top) = stack.last_mut() {
            let (node, next_index) = *top;
            let successors = adj.get(&node).copied().unwrap_or_default();
            let Some(&next) = successors.get(next_index) else {
                in_stack.remove(&node);
                stack.pop();
                continue;
            };
            top.1 += 1;

            if !adj.contains_key(&next) {
                continue;
            }
            if in_stack.contains(&next) {
                return Some(next); // Back edge → cycle
            }
            if visited.insert(next) {
                in_stack.insert(next);
                stack.push((next, 0));
            }
        }
    }

    None
}

/// Checks a schedule against every invariant of the project.
///
/// Checks:
/// 1. Every task is timed, `end == start + duration`, within `[0, horizon]`
/// 2. `start[successor] >= end[task]` for every precedence edge
/// 3. Per declared resource with positive capacity and per time unit,
///    concurrent demand does not exceed capacity
pub fn check_schedule(
    project: &ProjectDescription,
    schedule: &ScheduleAssignment,
) -> ValidationResult<Violation> {
    let mut violations = Vec::new();
    let horizon = project.horizon();

    for task in project.tasks() {
        let Some(timed) = schedule.get(task.id) else {
            violations.push(Violation::new(
                ViolationType::MissingTask,
                task.id.to_string(),
                format!("task {} is not scheduled", task.id),
            ));
            continue;
        };

        if timed.end != timed.start + task.duration {
            violations.push(Violation::new(
                ViolationType::DurationMismatch,
                task.id.to_string(),
                format!(
                    "task {} runs [{}, {}) but lasts {}",
                    task.id, timed.start, timed.end, task.duration
                ),
            ));
        }

        if timed.start < 0 || timed.end > horizon {
            violations.push(Violation::new(
                ViolationType::OutsideHorizon,
                task.id.to_string(),
                format!(
                    "task {} runs [{}, {}) outside [0, {}]",
                    task.id, timed.start, timed.end, horizon
                ),
            ));
        }

        for &successor in &task.successors {
            if let Some(next) = schedule.get(successor) {
                if next.start < timed.end {
                    violations.push(Violation::new(
                        ViolationType::PrecedenceViolation,
                        successor.to_string(),
                        format!(
                            "task {} starts at {} before predecessor {} ends at {}",
                            successor, next.start, task.id, timed.end
                        ),
                    ));
                }
            }
        }
    }

    // Usage only rises when a task starts, so those are the points to check.
    let mut checkpoints: Vec<i64> = schedule
        .tasks
        .iter()
        .filter(|t| t.end > t.start)
        .map(|t| t.start)
        .collect();
    checkpoints.sort_unstable();
    checkpoints.dedup();

    for resource in project.resources().iter().filter(|r| r.is_active()) {
        for &t in &checkpoints {
            let usage = schedule.usage_at(project, &resource.id, t);
            if usage > resource.capacity {
                violations.push(Violation::new(
                    ViolationType::CapacityExceeded,
                    resource.id.clone(),
                    format!(
                        "resource {} uses {} > {} at t={}",
                        resource.id, usage, resource.capacity, t
                    ),
                ));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
