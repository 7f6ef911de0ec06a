//! Project description.
//!
//! The immutable input of the scheduling core: a horizon, the tasks and
//! the resource capacities. Built once (usually by the `psplib` reader)
//! and read by the model builder for every strategy attempt.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::{Resource, Task, TaskId};
use crate::error::ProjectError;

/// A single-mode resource-constrained project.
///
/// Fields are private: once constructed, the description cannot change.
/// Identifier uniqueness and non-negative quantities are checked by
/// [`ProjectDescription::new`]; structural checks (successor references,
/// cycles, capacity fit) happen at model-build time.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDescription {
    horizon: i64,
    tasks: Vec<Task>,
    resources: Vec<Resource>,
    #[serde(skip)]
    index: HashMap<TaskId, usize>,
}

impl ProjectDescription {
    /// Creates a project description.
    ///
    /// # Errors
    /// Task id 0, duplicate task or resource ids, negative durations,
    /// negative demands and negative capacities.
    pub fn new(
        horizon: i64,
        tasks: Vec<Task>,
        resources: Vec<Resource>,
    ) -> Result<Self, ProjectError> {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if task.id == 0 {
                return Err(ProjectError::NonPositiveId(task.id));
            }
            if index.insert(task.id, i).is_some() {
                return Err(ProjectError::DuplicateTask(task.id));
            }
            if task.duration < 0 {
                return Err(ProjectError::NegativeDuration {
                    task: task.id,
                    duration: task.duration,
                });
            }
            if let Some((resource, &demand)) = task.demands.iter().find(|&(_, &q)| q < 0) {
                return Err(ProjectError::NegativeDemand {
                    task: task.id,
                    resource: resource.clone(),
                    demand,
                });
            }
        }

        let mut seen = HashSet::new();
        for r in &resources {
            if !seen.insert(r.id.as_str()) {
                return Err(ProjectError::DuplicateResource(r.id.clone()));
            }
            if r.capacity < 0 {
                return Err(ProjectError::NegativeCapacity {
                    resource: r.id.clone(),
                    capacity: r.capacity,
                });
            }
        }

        Ok(Self {
            horizon,
            tasks,
            resources,
            index,
        })
    }

    /// Upper bound on every time coordinate.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Declared resources in declaration order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Looks up a task by id.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).map(|&i| &self.tasks[i])
    }

    /// Position of a task in declaration order.
    pub fn task_index(&self, id: TaskId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Capacity of a resource; undeclared resources have capacity 0.
    pub fn capacity(&self, resource: &str) -> i64 {
        self.resources
            .iter()
            .find(|r| r.id == resource)
            .map(|r| r.capacity)
            .unwrap_or(0)
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Sum of all durations: makespan of a fully serial schedule.
    pub fn total_duration(&self) -> i64 {
        self.tasks.iter().map(|t| t.duration).sum()
    }
}
