//! Task (project activity) model.
//!
//! A task is a single-mode project activity: a fixed duration, a demand on
//! each renewable resource, and a list of direct successors.
//!
//! # Reference
//! Kolisch & Sprecher (1997), "PSPLIB - A project scheduling problem library"

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task identifier (job number in the project file).
pub type TaskId = u32;

/// A project task to be scheduled.
///
/// # Time Representation
/// Durations are integral time units (days in PSPLIB instances), counted
/// from the project start at t=0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Processing time (time units).
    pub duration: i64,
    /// Units required per resource while the task runs.
    ///
    /// Ordered by resource id so derived labels are stable.
    pub demands: BTreeMap<String, i64>,
    /// Tasks that may only start once this one has finished.
    pub successors: Vec<TaskId>,
}

impl Task {
    /// Creates a task with no demands and no successors.
    pub fn new(id: TaskId, duration: i64) -> Self {
        Self {
            id,
            duration,
            demands: BTreeMap::new(),
            successors: Vec::new(),
        }
    }

    /// Sets the demand for a resource.
    pub fn with_demand(mut self, resource: impl Into<String>, quantity: i64) -> Self {
        self.demands.insert(resource.into(), quantity);
        self
    }

    /// Adds a direct successor.
    pub fn with_successor(mut self, successor: TaskId) -> Self {
        self.successors.push(successor);
        self
    }

    /// Adds several direct successors.
    pub fn with_successors(mut self, successors: impl IntoIterator<Item = TaskId>) -> Self {
        self.successors.extend(successors);
        self
    }

    /// Demand for a resource (0 if the task does not use it).
    pub fn demand(&self, resource: &str) -> i64 {
        self.demands.get(resource).copied().unwrap_or(0)
    }

    /// Resources this task actually occupies (positive demand), in id order.
    pub fn used_resources(&self) -> impl Iterator<Item = &str> {
        self.demands
            .iter()
            .filter(|&(_, &q)| q > 0)
            .map(|(r, _)| r.as_str())
    }

    /// Label shown for every time unit the task runs.
    ///
    /// Resource ids with positive demand joined by `+`, or `R0` when the
    /// task uses no resource.
    pub fn occupancy_label(&self) -> String {
        let used: Vec<&str> = self.used_resources().collect();
        if used.is_empty() {
            "R0".to_string()
        } else {
            used.join("+")
        }
    }
}
