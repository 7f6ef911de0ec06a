//! Resource-constrained project scheduling (RCPSP) for the U-Engine ecosystem.
//!
//! Builds a constraint model from a project description, solves it under
//! several search strategies and keeps the best run by a deterministic
//! tie-break (makespan, then efficiency, then process time).
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Resource`, `ProjectDescription`,
//!   `ScheduleAssignment`
//! - **`validation`**: Project checks (horizon, successor references, demand
//!   vs capacity, precedence cycles) and schedule invariant checks
//! - **`cp`**: Project-to-model builder over `u_metaheur::cp`, the
//!   `SolveEngine` contract and the built-in branch-and-bound engine
//! - **`comparator`**: `StrategyComparator` and the one-pass efficiency ledger
//! - **`psplib`**: Sectioned project file reader
//! - **`report`**: CSV performance table and console schedule grid
//! - **`config`**: JSON run configuration
//!
//! # Example
//!
//! ```
//! use u_rcpsp::comparator::StrategyComparator;
//! use u_rcpsp::cp::BranchAndBoundEngine;
//! use u_rcpsp::models::{ProjectDescription, Resource, Task};
//!
//! let project = ProjectDescription::new(
//!     20,
//!     vec![
//!         Task::new(1, 3).with_demand("R1", 1).with_successor(2),
//!         Task::new(2, 4).with_demand("R1", 1).with_successor(3),
//!         Task::new(3, 2).with_demand("R1", 1),
//!     ],
//!     vec![Resource::new("R1", 1)],
//! ).unwrap();
//!
//! let report = StrategyComparator::new(BranchAndBoundEngine::new()).run(&project).unwrap();
//! assert_eq!(report.best.result.makespan, 9);
//! ```
//!
//! # References
//!
//! - Kolisch & Sprecher (1997), "PSPLIB - A project scheduling problem library"
//! - Brucker et al. (1999), "Resource-constrained project scheduling:
//!   Notation, classification, models, and methods"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod comparator;
pub mod config;
pub mod cp;
pub mod error;
pub mod models;
pub mod psplib;
pub mod report;
pub mod validation;
