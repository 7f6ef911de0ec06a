//! Solve engine contract.
//!
//! Models are `u_metaheur` [`CpModel`]s. Where `CpSolver` only returns a
//! status, a [`SolveEngine`] also takes a [`SearchStrategy`] and reports an
//! explicit infeasible or timeout outcome with search statistics. Engines
//! never mutate the model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use u_metaheur::cp::{CpModel, CpSolution, SolverStatus};

use crate::error::EngineError;

/// Integer variable that carries the makespan.
///
/// Engines bind it to the largest interval end under
/// `Objective::MinimizeMaxEnd`; its upper bound caps the objective.
pub const MAKESPAN_VAR: &str = "makespan";

/// Search configuration selector.
///
/// Strategies are compared in [`SearchStrategy::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Heuristic branching order chosen by the engine.
    #[serde(rename = "AUTOMATIC_SEARCH", alias = "AUTOMATIC")]
    Automatic,
    /// Branching in model declaration order.
    #[serde(rename = "FIXED_SEARCH", alias = "FIXED")]
    Fixed,
    /// Several heuristics raced for an initial bound, then automatic search.
    #[serde(rename = "PORTFOLIO_SEARCH", alias = "PORTFOLIO")]
    Portfolio,
}

impl SearchStrategy {
    /// Every strategy, in comparison order.
    pub const ALL: [SearchStrategy; 3] = [
        SearchStrategy::Automatic,
        SearchStrategy::Fixed,
        SearchStrategy::Portfolio,
    ];

    /// Report name (`AUTOMATIC_SEARCH`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::Automatic => "AUTOMATIC_SEARCH",
            SearchStrategy::Fixed => "FIXED_SEARCH",
            SearchStrategy::Portfolio => "PORTFOLIO_SEARCH",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    /// Accepts `automatic`, `AUTOMATIC_SEARCH` and similar, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let base = upper.strip_suffix("_SEARCH").unwrap_or(&upper);
        match base {
            "AUTOMATIC" => Ok(SearchStrategy::Automatic),
            "FIXED" => Ok(SearchStrategy::Fixed),
            "PORTFOLIO" => Ok(SearchStrategy::Portfolio),
            _ => Err(format!("unknown search strategy: {s}")),
        }
    }
}

/// Engine-reported search statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Wall time measured by the engine.
    pub wall_time: Duration,
    /// Failed or pruned search nodes.
    pub conflicts: u64,
    /// Search nodes entered.
    pub branches: u64,
}

/// Assignment returned by a successful solve.
#[derive(Debug, Clone)]
pub struct EngineSolution {
    /// Interval starts and ends, plus [`MAKESPAN_VAR`] when the model has it.
    pub solution: CpSolution,
    /// Objective value: the largest interval end.
    pub makespan: i64,
    /// Search statistics.
    pub stats: SolveStats,
}

impl EngineSolution {
    /// Whether optimality was proven.
    pub fn is_optimal(&self) -> bool {
        self.solution.status == SolverStatus::Optimal
    }
}

/// Result of one solve call.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// An assignment was found.
    Solved(EngineSolution),
    /// The search proved that no assignment exists.
    Infeasible(SolveStats),
    /// The time limit expired before any assignment was found.
    Timeout(SolveStats),
}

impl SolveOutcome {
    /// Statistics of the solve, whatever its outcome.
    pub fn stats(&self) -> &SolveStats {
        match self {
            SolveOutcome::Solved(solved) => &solved.stats,
            SolveOutcome::Infeasible(stats) | SolveOutcome::Timeout(stats) => stats,
        }
    }

    /// The assignment, if one was found.
    pub fn solution(&self) -> Option<&EngineSolution> {
        match self {
            SolveOutcome::Solved(solved) => Some(solved),
            _ => None,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Per-solve time limit; `None` searches to completion.
    pub time_limit: Option<Duration>,
    /// Seed of the randomized portfolio passes.
    pub seed: u64,
    /// Number of randomized passes in the portfolio.
    pub random_passes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            seed: 42,
            random_passes: 16,
        }
    }
}

/// Trait for solve engine implementations.
///
/// Implementors provide the actual constraint solving logic. Any internal
/// parallelism is the engine's own concern; the call is blocking.
pub trait SolveEngine {
    /// Solves the model with the given search strategy.
    ///
    /// # Errors
    /// [`EngineError`] if the model is malformed or uses constructs the
    /// engine cannot interpret. Infeasibility is an outcome, not an error.
    fn solve(&self, model: &CpModel, strategy: SearchStrategy)
        -> Result<SolveOutcome, EngineError>;
}
