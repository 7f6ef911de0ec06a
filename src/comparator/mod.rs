//! Strategy comparison.
//!
//! Solves the same project once per search strategy, in a fixed order, and
//! keeps the best run together with its schedule.
//!
//! # Algorithm
//!
//! For each strategy:
//! 1. Build a fresh model from the project (models are never reused).
//! 2. Time the solve call (`process_time`).
//! 3. On success, extract the schedule and record the run in the
//!    [`ResultLedger`], which assigns the one-pass efficiency and tracks the
//!    best run.
//! 4. Infeasible, timed-out and failed attempts are kept as failures and
//!    the next strategy is tried.
//!
//! The run fails with [`ComparisonError::ProjectInfeasible`] only when no
//! strategy produced a schedule. In strict mode a model construction error
//! aborts the whole run, since every strategy shares the same project.

mod result;

pub use result::{ResultLedger, StrategyResult};

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::cp::{build_model, SearchStrategy, SolveEngine, SolveOutcome, SolveStats};
use crate::error::{ComparisonError, EngineError, ModelError};
use crate::models::{ProjectDescription, ScheduleAssignment};

/// Reason a strategy attempt produced no schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptFailure {
    #[error("model construction failed: {0}")]
    Model(ModelError),

    #[error("engine error: {0}")]
    Engine(EngineError),

    #[error("infeasible")]
    Infeasible,

    #[error("time limit reached without a solution")]
    Timeout,
}

/// Best run and its schedule.
#[derive(Debug, Clone)]
pub struct BestRun {
    pub result: StrategyResult,
    pub schedule: ScheduleAssignment,
}

/// Outcome of a comparison with at least one successful strategy.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    /// Successful runs in attempt order.
    pub results: Vec<StrategyResult>,
    /// Failed attempts in attempt order.
    pub failures: Vec<(SearchStrategy, AttemptFailure)>,
    /// Winner by makespan, efficiency, process time.
    pub best: BestRun,
}

/// A solved attempt before it enters the ledger.
struct Solved {
    makespan: i64,
    stats: SolveStats,
    process_time: Duration,
    schedule: ScheduleAssignment,
}

/// Runs every configured strategy against a [`SolveEngine`].
///
/// # Example
/// ```
/// use u_rcpsp::comparator::StrategyComparator;
/// use u_rcpsp::cp::BranchAndBoundEngine;
/// use u_rcpsp::models::{ProjectDescription, Resource, Task};
///
/// let project = ProjectDescription::new(
///     20,
///     vec![
///         Task::new(1, 3).with_demand("R1", 1).with_successor(2),
///         Task::new(2, 4).with_demand("R1", 1),
///     ],
///     vec![Resource::new("R1", 1)],
/// ).unwrap();
///
/// let report = StrategyComparator::new(BranchAndBoundEngine::new())
///     .run(&project)
///     .unwrap();
/// assert_eq!(report.results.len(), 3);
/// assert_eq!(report.best.result.makespan, 7);
/// ```
#[derive(Debug, Clone)]
pub struct StrategyComparator<E> {
    engine: E,
    strategies: Vec<SearchStrategy>,
    strict: bool,
}

impl<E: SolveEngine> StrategyComparator<E> {
    /// Creates a comparator over every strategy in [`SearchStrategy::ALL`] order.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            strategies: SearchStrategy::ALL.to_vec(),
            strict: false,
        }
    }

    /// Sets the strategies and their order.
    pub fn with_strategies(mut self, strategies: Vec<SearchStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Aborts on the first model construction error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Configured strategies.
    pub fn strategies(&self) -> &[SearchStrategy] {
        &self.strategies
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Compares the configured strategies on `project`.
    ///
    /// # Errors
    /// - [`ComparisonError::ProjectInfeasible`] if no strategy succeeded
    /// - [`ComparisonError::Model`] in strict mode, on the first model error
    pub fn run(&self, project: &ProjectDescription) -> Result<ComparisonReport, ComparisonError> {
        let mut ledger = ResultLedger::new();
        let mut best_schedule: Option<ScheduleAssignment> = None;
        let mut failures = Vec::new();

        for &strategy in &self.strategies {
            match self.attempt(project, strategy) {
                Ok(solved) => {
                    let is_best =
                        ledger.record(strategy, &solved.stats, solved.makespan, solved.process_time);
                    if let Some(result) = ledger.results().last() {
                        info!(
                            strategy = %strategy,
                            makespan = result.makespan,
                            process_time = result.process_time_secs(),
                            efficiency = result.efficiency,
                            "strategy solved"
                        );
                    }
                    if is_best {
                        best_schedule = Some(solved.schedule);
                    }
                }
                Err(AttemptFailure::Model(e)) if self.strict => {
                    warn!(strategy = %strategy, error = %e, "model construction failed, aborting");
                    return Err(ComparisonError::Model(e));
                }
                Err(failure) => {
                    warn!(strategy = %strategy, reason = %failure, "strategy failed");
                    failures.push((strategy, failure));
                }
            }
        }

        let (results, best) = ledger.into_parts();
        match (best, best_schedule) {
            (Some(result), Some(schedule)) => {
                info!(
                    strategy = %result.strategy,
                    makespan = result.makespan,
                    "best strategy"
                );
                Ok(ComparisonReport {
                    results,
                    failures,
                    best: BestRun { result, schedule },
                })
            }
            _ => Err(ComparisonError::ProjectInfeasible { failures }),
        }
    }

    /// Builds, solves and extracts one strategy attempt.
    fn attempt(
        &self,
        project: &ProjectDescription,
        strategy: SearchStrategy,
    ) -> Result<Solved, AttemptFailure> {
        info!(strategy = %strategy, "solving");
        let built = build_model(project).map_err(AttemptFailure::Model)?;

        let started = Instant::now();
        let outcome = self.engine.solve(&built.model, strategy);
        let process_time = started.elapsed();

        match outcome.map_err(AttemptFailure::Engine)? {
            SolveOutcome::Solved(solved) => {
                let schedule = built
                    .extract(&solved.solution)
                    .map_err(AttemptFailure::Engine)?;
                Ok(Solved {
                    makespan: solved.makespan,
                    stats: solved.stats,
                    process_time,
                    schedule,
                })
            }
            SolveOutcome::Infeasible(_) => Err(AttemptFailure::Infeasible),
            SolveOutcome::Timeout(_) => Err(AttemptFailure::Timeout),
        }
    }
}
