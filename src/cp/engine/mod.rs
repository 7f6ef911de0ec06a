//! Built-in exact solve engine.
//!
//! [`BranchAndBoundEngine`] solves scheduling-shaped [`CpModel`]s:
//! fixed-duration intervals, precedence constraints, cumulative or
//! no-overlap resources and the `MinimizeMaxEnd` objective. Anything else
//! is reported as [`EngineError::Unsupported`].
//!
//! # Strategies
//!
//! | Strategy | Initial incumbent | Branching |
//! |----------|-------------------|-----------|
//! | `FIXED_SEARCH` | none | declaration order |
//! | `AUTOMATIC_SEARCH` | one LFT pass | earliest start, then LFT |
//! | `PORTFOLIO_SEARCH` | best of all rules + seeded random passes | earliest start, then LFT |
//!
//! As a `u_metaheur` [`CpSolver`](u_metaheur::cp::CpSolver) the engine runs
//! the automatic strategy under the solver config's time limit.

mod network;
mod profile;
mod search;
mod sgs;

use std::time::{Duration, Instant};

use tracing::{debug, warn};
use u_metaheur::cp::{CpModel, CpSolution, SolverConfig, SolverStatus};

use self::network::{Compiled, Network};
use self::search::{Branching, Search};
use self::sgs::{randomized_priorities, serial_schedule, PriorityRule};
use super::solver::{
    EngineConfig, EngineSolution, SearchStrategy, SolveEngine, SolveOutcome, SolveStats,
};
use crate::error::EngineError;

/// Exact branch-and-bound engine for project scheduling models.
///
/// Deterministic for a given configuration unless a time limit fires.
///
/// # Example
/// ```
/// use u_rcpsp::cp::{build_model, BranchAndBoundEngine, SearchStrategy, SolveEngine};
/// use u_rcpsp::models::{ProjectDescription, Resource, Task};
///
/// let project = ProjectDescription::new(
///     20,
///     vec![Task::new(1, 3).with_demand("R1", 1), Task::new(2, 2).with_demand("R1", 1)],
///     vec![Resource::new("R1", 1)],
/// ).unwrap();
/// let built = build_model(&project).unwrap();
/// let outcome = BranchAndBoundEngine::new()
///     .solve(&built.model, SearchStrategy::Automatic)
///     .unwrap();
/// assert_eq!(outcome.solution().unwrap().makespan, 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BranchAndBoundEngine {
    config: EngineConfig,
}

impl BranchAndBoundEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a per-solve time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Best heuristic schedule for the strategy, if it uses one.
    fn incumbent(&self, net: &Network, strategy: SearchStrategy) -> Option<(Vec<i64>, i64)> {
        let candidates: Vec<(&'static str, Vec<f64>)> = match strategy {
            SearchStrategy::Fixed => return None,
            SearchStrategy::Automatic => {
                vec![(PriorityRule::Lft.name(), PriorityRule::Lft.priorities(net))]
            }
            SearchStrategy::Portfolio => PriorityRule::ALL
                .iter()
                .map(|rule| (rule.name(), rule.priorities(net)))
                .chain(
                    randomized_priorities(net, self.config.seed, self.config.random_passes)
                        .into_iter()
                        .map(|priorities| ("random", priorities)),
                )
                .collect(),
        };

        let (rule, best) = candidates
            .iter()
            .filter_map(|(rule, priorities)| serial_schedule(net, priorities).map(|s| (*rule, s)))
            .filter(|(_, (_, makespan))| *makespan <= net.objective_max)
            .min_by_key(|(_, (_, makespan))| *makespan)?;
        debug!(strategy = %strategy, rule, makespan = best.1, "heuristic incumbent");
        Some(best)
    }

    /// Compiles and searches `model` under an explicit time limit.
    fn run(
        &self,
        model: &CpModel,
        strategy: SearchStrategy,
        time_limit: Option<Duration>,
    ) -> Result<SolveOutcome, EngineError> {
        let started = Instant::now();
        let deadline = time_limit.map(|limit| started + limit);

        let net = match Network::compile(model)? {
            Compiled::Network(net) => net,
            Compiled::Infeasible => {
                return Ok(SolveOutcome::Infeasible(SolveStats {
                    wall_time: started.elapsed(),
                    ..Default::default()
                }))
            }
        };

        let incumbent = self.incumbent(&net, strategy);

        let branching = match strategy {
            SearchStrategy::Fixed => Branching::Declaration,
            SearchStrategy::Automatic | SearchStrategy::Portfolio => Branching::EarliestStart,
        };
        let result = Search::new(&net, branching, incumbent, deadline).run();

        let stats = SolveStats {
            wall_time: started.elapsed(),
            conflicts: result.conflicts,
            branches: result.branches,
        };
        debug!(
            strategy = %strategy,
            conflicts = stats.conflicts,
            branches = stats.branches,
            timed_out = result.timed_out,
            "search finished"
        );

        Ok(match result.best {
            Some((starts, _)) => {
                let status = if result.timed_out {
                    SolverStatus::Feasible
                } else {
                    SolverStatus::Optimal
                };
                let (mut solution, makespan) = net.solution(&starts, status);
                solution.solve_time_ms = stats.wall_time.as_millis() as i64;
                SolveOutcome::Solved(EngineSolution {
                    solution,
                    makespan,
                    stats,
                })
            }
            None if result.timed_out => SolveOutcome::Timeout(stats),
            None => SolveOutcome::Infeasible(stats),
        })
    }
}

impl SolveEngine for BranchAndBoundEngine {
    fn solve(
        &self,
        model: &CpModel,
        strategy: SearchStrategy,
    ) -> Result<SolveOutcome, EngineError> {
        self.run(model, strategy, self.config.time_limit)
    }
}

impl u_metaheur::cp::CpSolver for BranchAndBoundEngine {
    /// Automatic search; a positive `time_limit_ms` bounds it.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let limit = u64::try_from(config.time_limit_ms)
            .ok()
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);
        let (status, stats) = match self.run(model, SearchStrategy::Automatic, limit) {
            Ok(SolveOutcome::Solved(solved)) => return solved.solution,
            Ok(SolveOutcome::Infeasible(stats)) => (SolverStatus::Infeasible, stats),
            Ok(SolveOutcome::Timeout(stats)) => (SolverStatus::Timeout, stats),
            Err(e) => {
                warn!(error = %e, "model rejected");
                (SolverStatus::ModelInvalid, SolveStats::default())
            }
        };
        let mut solution = CpSolution::empty(status);
        solution.solve_time_ms = stats.wall_time.as_millis() as i64;
        solution
    }
}
