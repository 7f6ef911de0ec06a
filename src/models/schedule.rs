//! Schedule (solution) model.
//!
//! A schedule assigns a start and end time to every task of a project.
//! Occupancy labels derived from it feed the console schedule grid.
//!
//! # Reference
//! Kolisch & Hartmann (1999), "Heuristic Algorithms for the
//! Resource-Constrained Project Scheduling Problem", Sec. 2

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::{ProjectDescription, TaskId};

/// Start/end times for all tasks of one solved project.
///
/// Tasks keep the project's declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    /// Timed tasks.
    pub tasks: Vec<ScheduledTask>,
}

/// A task placed on the timeline, occupying `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Task identifier.
    pub task_id: TaskId,
    /// Start time.
    pub start: i64,
    /// End time (`start + duration`).
    pub end: i64,
}

/// Per-time-unit resource occupancy of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOccupancy {
    /// Task identifier.
    pub task_id: TaskId,
    /// Time units the task runs.
    pub span: Range<i64>,
    /// Resources occupied in each unit (`R1+R3`, or `R0` for none).
    pub label: String,
}

/// A schedule invariant that does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related task or resource id.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// `end != start + duration`.
    DurationMismatch,
    /// A successor started before its predecessor ended.
    PrecedenceViolation,
    /// Concurrent demand above a resource's capacity.
    CapacityExceeded,
    /// A time coordinate outside `[0, horizon]`.
    OutsideHorizon,
    /// A task of the project has no entry in the schedule.
    MissingTask,
}

impl ScheduledTask {
    /// Creates a timed task.
    pub fn new(task_id: TaskId, start: i64, end: i64) -> Self {
        Self {
            task_id,
            start,
            end,
        }
    }

    /// Whether the task runs during time unit `t`.
    #[inline]
    pub fn is_active_at(&self, t: i64) -> bool {
        self.start <= t && t < self.end
    }
}

impl TaskOccupancy {
    /// Time units with their label.
    pub fn units(&self) -> impl Iterator<Item = (i64, &str)> + '_ {
        self.span.clone().map(move |t| (t, self.label.as_str()))
    }
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

impl ScheduleAssignment {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a timed task.
    pub fn push(&mut self, task: ScheduledTask) {
        self.tasks.push(task);
    }

    /// Finds the entry for a task.
    pub fn get(&self, task_id: TaskId) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    /// Latest end time (0 for an empty schedule).
    pub fn makespan(&self) -> i64 {
        self.tasks.iter().map(|t| t.end).max().unwrap_or(0)
    }

    /// Number of timed tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is timed.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Total demand for `resource` of tasks running during time unit `t`.
    pub fn usage_at(&self, project: &ProjectDescription, resource: &str, t: i64) -> i64 {
        self.tasks
            .iter()
            .filter(|s| s.is_active_at(t))
            .filter_map(|s| project.task(s.task_id))
            .map(|task| task.demand(resource))
            .sum()
    }

    /// Derives the occupancy label of every timed task.
    ///
    /// Pure function of this schedule and the tasks' declared demands;
    /// entries whose task is not in `project` are skipped.
    pub fn occupancy(&self, project: &ProjectDescription) -> Vec<TaskOccupancy> {
        self.tasks
            .iter()
            .filter_map(|s| {
                project.task(s.task_id).map(|task| TaskOccupancy {
                    task_id: s.task_id,
                    span: s.start..s.end,
                    label: task.occupancy_label(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Resource, Task};

    fn project() -> ProjectDescription {
        ProjectDescription::new(
            10,
            vec![
                Task::new(1, 3).with_demand("R1", 1).with_demand("R2", 2),
                Task::new(2, 2).with_demand("R1", 1),
                Task::new(3, 1),
            ],
            vec![Resource::new("R1", 2), Resource::new("R2", 2)],
        )
        .unwrap()
    }

    fn sample_schedule() -> ScheduleAssignment {
        let mut s = ScheduleAssignment::new();
        s.push(ScheduledTask::new(1, 0, 3));
        s.push(ScheduledTask::new(2, 1, 3));
        s.push(ScheduledTask::new(3, 3, 4));
        s
    }

    #[test]
    fn test_schedule_makespan() {
        assert_eq!(sample_schedule().makespan(), 4);
        assert_eq!(ScheduleAssignment::new().makespan(), 0);
        assert!(ScheduleAssignment::new().is_empty());
    }

    #[test]
    fn test_get() {
        let s = sample_schedule();
        assert_eq!(s.get(2), Some(&ScheduledTask::new(2, 1, 3)));
        assert!(s.get(9).is_none());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_usage_at() {
        let p = project();
        let s = sample_schedule();
        assert_eq!(s.usage_at(&p, "R1", 0), 1);
        assert_eq!(s.usage_at(&p, "R1", 2), 2);
        assert_eq!(s.usage_at(&p, "R1", 3), 0); // end is exclusive
        assert_eq!(s.usage_at(&p, "R2", 1), 2);
    }

    #[test]
    fn test_occupancy() {
        let p = project();
        let occ = sample_schedule().occupancy(&p);
        assert_eq!(occ.len(), 3);
        assert_eq!(occ[0].label, "R1+R2");
        assert_eq!(occ[2].label, "R0");

        let units: Vec<(i64, &str)> = occ[1].units().collect();
        assert_eq!(units, vec![(1, "R1"), (2, "R1")]);
    }

    #[test]
    fn test_zero_duration_has_no_units() {
        let p = project();
        let mut s = ScheduleAssignment::new();
        s.push(ScheduledTask::new(3, 5, 5));
        assert_eq!(s.occupancy(&p)[0].units().count(), 0);
    }
}
