//! CP-based project scheduling formulation.
//!
//! Translates a [`ProjectDescription`] into a `u_metaheur` [`CpModel`]:
//!
//! - One fixed-duration [`IntervalVar`] per task, start in
//!   `[0, horizon - duration]` and end in `[duration, horizon]`. Its start
//!   and end time variables are `start_t` and `end_t`, linked by
//!   `end_t == start_t + duration_t`.
//! - `Precedence { before: t, after: s, min_delay: 0 }`, i.e.
//!   `start_s >= end_t`, for every successor `s` of `t`
//! - One `Cumulative` constraint per resource with positive capacity
//! - A [`MAKESPAN_VAR`] integer variable in `[0, horizon]`, equal to the
//!   largest end under the `MinimizeMaxEnd` objective
//!
//! The builder is a pure function: every call returns a fresh model and
//! the project is only read.
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

use std::collections::BTreeSet;

use tracing::{debug, warn};
use u_metaheur::cp::{CpModel, IntVar, IntervalVar, Objective};

use super::solver::MAKESPAN_VAR;
use crate::error::ModelError;
use crate::models::{ProjectDescription, TaskId};
use crate::validation::validate_project;

/// Model handles belonging to one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskVars {
    /// Task identifier.
    pub task_id: TaskId,
    /// Name of the task's occupancy interval.
    pub interval: String,
}

/// A CP model together with the handles needed to read a schedule back.
#[derive(Debug, Clone)]
pub struct ScheduleModel {
    /// The constraint model handed to the engine.
    pub model: CpModel,
    /// Per-task handles, in project order.
    pub tasks: Vec<TaskVars>,
}

impl ScheduleModel {
    /// Handles of a task.
    pub fn task_vars(&self, task_id: TaskId) -> Option<&TaskVars> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }
}

/// Interval name of a task.
pub fn interval_name(task_id: TaskId) -> String {
    format!("task_{task_id}")
}

/// Builds the scheduling model of a project.
///
/// # Errors
/// [`ModelError`] when the project fails validation (non-positive horizon,
/// undeclared successor, single-task demand above capacity, precedence
/// cycle). Only the first problem is returned; the rest are logged.
pub fn build_model(project: &ProjectDescription) -> Result<ScheduleModel, ModelError> {
    if let Err(errors) = validate_project(project) {
        for extra in errors.iter().skip(1) {
            debug!(error = %extra, "additional model error");
        }
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }
    }

    let horizon = project.horizon();
    let mut model = CpModel::new("rcpsp", horizon);

    let tasks: Vec<TaskVars> = project
        .tasks()
        .iter()
        .map(|task| TaskVars {
            task_id: task.id,
            interval: interval_name(task.id),
        })
        .collect();

    for (task, vars) in project.tasks().iter().zip(&tasks) {
        // A duration above the horizon leaves an empty start window, which
        // the engine reports as infeasible.
        model.add_interval(IntervalVar::new(
            vars.interval.clone(),
            0,
            horizon - task.duration,
            task.duration,
            horizon,
        ));
    }

    for task in project.tasks() {
        for &successor in &task.successors {
            model.add_precedence(interval_name(task.id), interval_name(successor), 0);
        }
    }

    for resource in project.resources() {
        if !resource.is_active() {
            warn!(resource = %resource.id, "zero-capacity resource skipped");
            continue;
        }
        let (intervals, demands): (Vec<String>, Vec<i64>) = project
            .tasks()
            .iter()
            .zip(&tasks)
            .map(|(task, vars)| (vars.interval.clone(), task.demand(&resource.id)))
            .filter(|&(_, demand)| demand > 0)
            .unzip();
        if intervals.is_empty() {
            continue;
        }
        model.add_cumulative(intervals, demands, resource.capacity);
    }

    let undeclared: BTreeSet<&str> = project
        .tasks()
        .iter()
        .flat_map(|t| t.used_resources())
        .filter(|r| project.capacity(r) == 0)
        .collect();
    if !undeclared.is_empty() {
        debug!(resources = ?undeclared, "demands on resources without capacity ignored");
    }

    model.add_int_var(IntVar::new(MAKESPAN_VAR, 0, horizon));
    model.set_objective(Objective::MinimizeMaxEnd);

    debug!(
        intervals = model.interval_count(),
        constraints = model.constraint_count(),
        "model built"
    );

    Ok(ScheduleModel { model, tasks })
}
