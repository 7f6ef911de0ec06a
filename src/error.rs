//! Error taxonomy.
//!
//! One error enum per layer:
//!
//! | Error | Raised by | Effect |
//! |-------|-----------|--------|
//! | [`ProjectError`] | `ProjectDescription::new` | invalid data, nothing is built |
//! | [`ParseError`] | `psplib` reader | fatal, aborts before any solving |
//! | [`ConfigError`] | `RunConfig::from_json_file` | fatal, aborts before any solving |
//! | [`ModelError`] | `cp::build_model` | fatal for one strategy attempt (or the run, in strict mode) |
//! | [`EngineError`] | `SolveEngine` implementations | model shape the engine cannot interpret |
//! | [`ComparisonError`] | `StrategyComparator::run` | every attempt failed |
//!
//! Infeasible and timed-out solves are outcomes, not errors: see `cp::SolveOutcome`.

use std::path::PathBuf;

use crate::comparator::AttemptFailure;
use crate::cp::SearchStrategy;
use crate::models::TaskId;

/// Invalid in-memory project data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    #[error("task id must be positive, got {0}")]
    NonPositiveId(TaskId),

    #[error("duplicate task id {0}")]
    DuplicateTask(TaskId),

    #[error("duplicate resource id '{0}'")]
    DuplicateResource(String),

    #[error("task {task} has negative duration {duration}")]
    NegativeDuration { task: TaskId, duration: i64 },

    #[error("task {task} has negative demand {demand} for resource '{resource}'")]
    NegativeDemand {
        task: TaskId,
        resource: String,
        demand: i64,
    },

    #[error("resource '{resource}' has negative capacity {capacity}")]
    NegativeCapacity { resource: String, capacity: i64 },
}

/// Malformed project text.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing section '{0}'")]
    MissingSection(&'static str),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error(transparent)]
    Project(#[from] ProjectError),
}

impl ParseError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Unreadable run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Project data that cannot be turned into a scheduling model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("horizon must be positive, got {0}")]
    NonPositiveHorizon(i64),

    #[error("task {task} references undeclared successor {successor}")]
    UnknownSuccessor { task: TaskId, successor: TaskId },

    #[error("task {task} demands {demand} of '{resource}' but its capacity is {capacity}")]
    DemandExceedsCapacity {
        task: TaskId,
        resource: String,
        demand: i64,
        capacity: i64,
    },

    #[error("precedence cycle involving task {0}")]
    CyclicPrecedence(TaskId),
}

/// A model the engine cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unsupported model: {0}")]
    Unsupported(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("solution has no value for interval {0}")]
    MissingValue(String),
}

/// Failure of a whole strategy comparison run.
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("project infeasible: all {} strategies failed", failures.len())]
    ProjectInfeasible {
        failures: Vec<(SearchStrategy, AttemptFailure)>,
    },

    #[error("model construction failed: {0}")]
    Model(#[from] ModelError),
}
