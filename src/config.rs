//! Run configuration.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```json
//! { "strategies": ["PORTFOLIO_SEARCH", "AUTOMATIC_SEARCH"], "time_limit_secs": 30 }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cp::{EngineConfig, SearchStrategy};
use crate::error::ConfigError;

/// Settings of one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Strategies to compare, in order.
    pub strategies: Vec<SearchStrategy>,
    /// Per-solve time limit in seconds; none searches to completion.
    pub time_limit_secs: Option<f64>,
    /// Seed of the randomized portfolio passes.
    pub seed: u64,
    /// Randomized passes in the portfolio.
    pub random_passes: usize,
    /// Abort on the first model construction error.
    pub strict: bool,
    /// Performance table destination.
    pub output_csv: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            strategies: SearchStrategy::ALL.to_vec(),
            time_limit_secs: None,
            seed: engine.seed,
            random_passes: engine.random_passes,
            strict: false,
            output_csv: PathBuf::from("performance_results.csv"),
        }
    }
}

impl RunConfig {
    /// Loads a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Engine configuration derived from these settings.
    ///
    /// Negative or non-finite time limits are ignored.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            time_limit: self
                .time_limit_secs
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
            seed: self.seed,
            random_passes: self.random_passes,
        }
    }
}
