//! CP-based scheduling formulation.
//!
//! Bridges project descriptions to `u-metaheur`'s CP framework: turns a
//! [`ProjectDescription`](crate::models::ProjectDescription) into a
//! [`CpModel`] of interval variables, precedence and cumulative
//! constraints, hands it to a [`SolveEngine`] and reads the intervals back
//! into a [`ScheduleAssignment`](crate::models::ScheduleAssignment).
//!
//! # Layout
//!
//! - [`builder`]: project to model translation
//! - [`solver`]: engine contract, strategies, outcomes
//! - [`engine`]: built-in branch-and-bound engine (also a [`CpSolver`])
//! - [`extract`]: solution to schedule translation
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

pub mod builder;
pub mod engine;
pub mod extract;
pub mod solver;

pub use builder::{build_model, interval_name, ScheduleModel, TaskVars};
pub use engine::BranchAndBoundEngine;
pub use extract::extract_schedule;
pub use solver::{
    EngineConfig, EngineSolution, SearchStrategy, SolveEngine, SolveOutcome, SolveStats,
    MAKESPAN_VAR,
};
pub use u_metaheur::cp::{
    Constraint, CpModel, CpSolution, CpSolver, IntervalSolution, IntervalVar, Objective,
    SolverConfig, SolverStatus,
};
