//! Reads a per-task timeline back out of a solver assignment.

use u_metaheur::cp::CpSolution;

use super::builder::ScheduleModel;
use crate::error::EngineError;
use crate::models::{ScheduleAssignment, ScheduledTask};

/// Converts a solution of `built` into a schedule.
///
/// Pure: no solving happens here, tasks keep project order.
///
/// # Errors
/// [`EngineError::MissingValue`] if the solution has no present interval
/// for some task.
pub fn extract_schedule(
    built: &ScheduleModel,
    solution: &CpSolution,
) -> Result<ScheduleAssignment, EngineError> {
    let mut schedule = ScheduleAssignment::new();
    for vars in &built.tasks {
        let timed = solution
            .intervals
            .get(&vars.interval)
            .filter(|s| s.is_present)
            .ok_or_else(|| EngineError::MissingValue(vars.interval.clone()))?;
        schedule.push(ScheduledTask::new(vars.task_id, timed.start, timed.end));
    }
    Ok(schedule)
}

impl ScheduleModel {
    /// See [`extract_schedule`].
    pub fn extract(&self, solution: &CpSolution) -> Result<ScheduleAssignment, EngineError> {
        extract_schedule(self, solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::build_model;
    use crate::models::{ProjectDescription, Task};
    use u_metaheur::cp::{IntervalSolution, SolverStatus};

    fn two_tasks() -> ScheduleModel {
        let project = ProjectDescription::new(
            10,
            vec![Task::new(7, 2).with_successor(9), Task::new(9, 3)],
            vec![],
        )
        .unwrap();
        build_model(&project).unwrap()
    }

    fn timed(start: i64, end: i64) -> IntervalSolution {
        IntervalSolution {
            start,
            end,
            duration: end - start,
            is_present: true,
        }
    }

    #[test]
    fn test_extract() {
        let built = two_tasks();
        let mut solution = CpSolution::empty(SolverStatus::Optimal);
        solution.intervals.insert("task_9".into(), timed(2, 5));
        solution.intervals.insert("task_7".into(), timed(0, 2));

        let schedule = built.extract(&solution).unwrap();
        assert_eq!(
            schedule.tasks,
            vec![ScheduledTask::new(7, 0, 2), ScheduledTask::new(9, 2, 5)]
        );
    }

    #[test]
    fn test_extract_missing_value() {
        let built = two_tasks();
        let mut solution = CpSolution::empty(SolverStatus::Feasible);
        solution.intervals.insert("task_7".into(), timed(0, 2));
        assert_eq!(
            extract_schedule(&built, &solution).unwrap_err(),
            EngineError::MissingValue("task_9".into())
        );

        let mut absent = timed(2, 5);
        absent.is_present = false;
        solution.intervals.insert("task_9".into(), absent);
        assert!(extract_schedule(&built, &solution).is_err());
    }
}
