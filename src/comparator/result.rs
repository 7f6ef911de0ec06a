//! Per-strategy run records and the one-pass efficiency ledger.
//!
//! # Efficiency
//!
//! `efficiency = 100 * min_process_time / process_time`, where
//! `min_process_time` is the fastest process time recorded *so far*
//! (including the current run). Earlier records keep the value they were
//! given, so the metric depends on the order runs are recorded in. The first
//! successful run always scores 100.
//!
//! # Best run
//!
//! | Priority | Criterion |
//! |----------|-----------|
//! | 1 | smaller makespan |
//! | 2 | greater efficiency |
//! | 3 | smaller process time |
//!
//! Only strict improvements replace the current best, so the earliest
//! record wins exact ties.

use std::time::Duration;

use serde::Serialize;

use crate::cp::{SearchStrategy, SolveStats};

/// Statistics of one successful strategy run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    /// Search strategy used.
    pub strategy: SearchStrategy,
    /// Wall time reported by the engine.
    pub wall_time: Duration,
    /// Engine conflict count.
    pub conflicts: u64,
    /// Engine branch count.
    pub branches: u64,
    /// Objective value.
    pub makespan: i64,
    /// Wall time measured by the caller around the solve call.
    pub process_time: Duration,
    /// Derived efficiency in percent.
    pub efficiency: f64,
}

impl StrategyResult {
    /// Engine wall time in seconds.
    pub fn wall_time_secs(&self) -> f64 {
        self.wall_time.as_secs_f64()
    }

    /// Process time in seconds.
    pub fn process_time_secs(&self) -> f64 {
        self.process_time.as_secs_f64()
    }

    /// Whether `self` should replace `incumbent` as the best run.
    pub fn beats(&self, incumbent: &StrategyResult) -> bool {
        if self.makespan != incumbent.makespan {
            return self.makespan < incumbent.makespan;
        }
        if self.efficiency != incumbent.efficiency {
            return self.efficiency > incumbent.efficiency;
        }
        self.process_time < incumbent.process_time
    }
}

/// Ordered record of successful runs with the running minimum and best.
#[derive(Debug, Clone, Default)]
pub struct ResultLedger {
    results: Vec<StrategyResult>,
    min_process_time: Option<Duration>,
    best: Option<usize>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful run and returns `true` if it became the best.
    pub fn record(
        &mut self,
        strategy: SearchStrategy,
        stats: &SolveStats,
        makespan: i64,
        process_time: Duration,
    ) -> bool {
        let min = self
            .min_process_time
            .map_or(process_time, |min| min.min(process_time));
        self.min_process_time = Some(min);

        let efficiency = if process_time > Duration::ZERO {
            100.0 * min.as_nanos() as f64 / process_time.as_nanos() as f64
        } else {
            0.0
        };

        let result = StrategyResult {
            strategy,
            wall_time: stats.wall_time,
            conflicts: stats.conflicts,
            branches: stats.branches,
            makespan,
            process_time,
            efficiency,
        };

        let is_best = match self.best() {
            None => true,
            Some(best) => result.beats(best),
        };
        self.results.push(result);
        if is_best {
            self.best = Some(self.results.len() - 1);
        }
        is_best
    }

    /// Records in insertion order.
    pub fn results(&self) -> &[StrategyResult] {
        &self.results
    }

    /// Current best record.
    pub fn best(&self) -> Option<&StrategyResult> {
        self.best.map(|i| &self.results[i])
    }

    /// Fastest process time recorded so far.
    pub fn min_process_time(&self) -> Option<Duration> {
        self.min_process_time
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consumes the ledger into all records and the best one.
    pub fn into_parts(self) -> (Vec<StrategyResult>, Option<StrategyResult>) {
        let best = self.best.map(|i| self.results[i].clone());
        (self.results, best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn stats() -> SolveStats {
        SolveStats::default()
    }

    #[test]
    fn test_first_run_is_100() {
        let mut ledger = ResultLedger::new();
        assert!(ledger.record(SearchStrategy::Automatic, &stats(), 9, ms(40)));
        assert_eq!(ledger.results()[0].efficiency, 100.0);
        assert_eq!(ledger.min_process_time(), Some(ms(40)));
    }

    #[test]
    fn test_efficiency_is_one_pass() {
        let mut ledger = ResultLedger::new();
        ledger.record(SearchStrategy::Automatic, &stats(), 9, ms(100));
        ledger.record(SearchStrategy::Fixed, &stats(), 9, ms(50));
        ledger.record(SearchStrategy::Portfolio, &stats(), 9, ms(200));

        let eff: Vec<f64> = ledger.results().iter().map(|r| r.efficiency).collect();
        // The first run is not rescored after the faster second one.
        assert_eq!(eff, vec![100.0, 100.0, 25.0]);
    }

    #[test]
    fn test_slower_second_run() {
        let mut ledger = ResultLedger::new();
        ledger.record(SearchStrategy::Automatic, &stats(), 9, ms(50));
        assert!(!ledger.record(SearchStrategy::Fixed, &stats(), 9, ms(100)));
        assert_eq!(ledger.results()[1].efficiency, 50.0);
        assert_eq!(ledger.best().unwrap().strategy, SearchStrategy::Automatic);
    }

    #[test]
    fn test_zero_process_time() {
        let mut ledger = ResultLedger::new();
        ledger.record(SearchStrategy::Automatic, &stats(), 9, Duration::ZERO);
        assert_eq!(ledger.results()[0].efficiency, 0.0);
    }

    #[test]
    fn test_smaller_makespan_wins() {
        let mut ledger = ResultLedger::new();
        ledger.record(SearchStrategy::Automatic, &stats(), 10, ms(10));
        assert!(ledger.record(SearchStrategy::Fixed, &stats(), 9, ms(500)));
        assert_eq!(ledger.best().unwrap().strategy, SearchStrategy::Fixed);
    }

    #[test]
    fn test_process_time_breaks_makespan_tie() {
        let mut ledger = ResultLedger::new();
        ledger.record(SearchStrategy::Automatic, &stats(), 9, ms(100));
        // 100 * 50 / 50 = 100, equal to the first; process time decides.
        assert!(ledger.record(SearchStrategy::Fixed, &stats(), 9, ms(50)));
        assert_eq!(ledger.best().unwrap().strategy, SearchStrategy::Fixed);
    }

    #[test]
    fn test_exact_tie_keeps_first() {
        let mut ledger = ResultLedger::new();
        ledger.record(SearchStrategy::Automatic, &stats(), 9, ms(20));
        assert!(!ledger.record(SearchStrategy::Fixed, &stats(), 9, ms(20)));
        assert!(!ledger.record(SearchStrategy::Portfolio, &stats(), 9, ms(20)));
        assert_eq!(ledger.best().unwrap().strategy, SearchStrategy::Automatic);
    }

    #[test]
    fn test_beats_order() {
        let base = StrategyResult {
            strategy: SearchStrategy::Automatic,
            wall_time: ms(1),
            conflicts: 0,
            branches: 0,
            makespan: 9,
            process_time: ms(10),
            efficiency: 80.0,
        };
        let higher_eff = StrategyResult {
            efficiency: 90.0,
            process_time: ms(30),
            ..base.clone()
        };
        let faster = StrategyResult {
            process_time: ms(5),
            ..base.clone()
        };
        assert!(higher_eff.beats(&base));
        assert!(!base.beats(&higher_eff));
        assert!(faster.beats(&base));
        assert!(!base.beats(&base));
    }

    #[test]
    fn test_into_parts() {
        let mut ledger = ResultLedger::new();
        assert!(ledger.is_empty());
        ledger.record(SearchStrategy::Automatic, &stats(), 11, ms(10));
        ledger.record(SearchStrategy::Fixed, &stats(), 9, ms(10));
        assert_eq!(ledger.len(), 2);
        let (results, best) = ledger.into_parts();
        assert_eq!(results.len(), 2);
        assert_eq!(best.unwrap().makespan, 9);
    }
}
