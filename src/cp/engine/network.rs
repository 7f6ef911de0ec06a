//! Compilation of a [`CpModel`] into a precedence network.
//!
//! The engine understands models made of fixed-duration mandatory
//! intervals, `Precedence` constraints with a non-negative delay,
//! `Cumulative` and `NoOverlap` resources, and the `MinimizeMaxEnd`
//! objective. The only integer variable allowed is [`MAKESPAN_VAR`].
//!
//! Intervals are indexed in name order, which is the declaration order
//! seen by fixed-order branching.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use u_metaheur::cp::{Constraint, CpModel, CpSolution, IntervalSolution, Objective, SolverStatus};

use crate::cp::solver::MAKESPAN_VAR;
use crate::error::EngineError;

/// A renewable resource as seen by the engine.
#[derive(Debug, Clone)]
pub(crate) struct CumulativeResource {
    pub capacity: i64,
    /// Demand per interval (0 for intervals outside the constraint).
    pub demands: Vec<i64>,
}

/// Precedence network with resource data, indexed by interval.
#[derive(Debug, Clone)]
pub(crate) struct Network {
    pub names: Vec<String>,
    pub durations: Vec<i64>,
    /// `(predecessor, lag)`: the interval starts at least `lag` after the
    /// predecessor's start.
    pub preds: Vec<Vec<(usize, i64)>>,
    /// `(successor, lag)`, mirror of `preds`.
    pub succs: Vec<Vec<(usize, i64)>>,
    /// Earliest/latest start from the variable domains.
    pub start_min: Vec<i64>,
    pub start_max: Vec<i64>,
    /// Topological order and the position of each interval in it.
    pub topo: Vec<usize>,
    pub rank: Vec<usize>,
    /// Duration plus longest path to the end of the project.
    pub tails: Vec<i64>,
    pub resources: Vec<CumulativeResource>,
    /// Largest admissible objective value.
    pub objective_max: i64,
    /// Whether solutions carry a [`MAKESPAN_VAR`] value.
    pub has_makespan_var: bool,
}

/// Result of compilation: a network, or a proof that none can exist.
pub(crate) enum Compiled {
    Network(Network),
    /// Precedence cycle, empty time window or demand above capacity.
    Infeasible,
}

impl Network {
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn compile(model: &CpModel) -> Result<Compiled, EngineError> {
        model.validate().map_err(EngineError::InvalidModel)?;

        match &model.objective {
            Some(Objective::MinimizeMaxEnd) => {}
            Some(other) => {
                return Err(EngineError::Unsupported(format!("objective {other:?}")))
            }
            None => return Err(EngineError::Unsupported("missing objective".into())),
        }

        if let Some(name) = model.bool_vars.keys().min() {
            return Err(EngineError::Unsupported(format!("boolean variable {name}")));
        }
        if let Some(name) = model
            .int_vars
            .keys()
            .filter(|name| name.as_str() != MAKESPAN_VAR)
            .min()
        {
            return Err(EngineError::Unsupported(format!(
                "integer variable {name} has no role"
            )));
        }

        let mut objective_max = model.horizon;
        let has_makespan_var = match model.int_vars.get(MAKESPAN_VAR) {
            Some(var) if var.min > 0 => {
                return Err(EngineError::Unsupported(
                    "makespan with a positive lower bound".into(),
                ))
            }
            Some(var) => {
                objective_max = objective_max.min(var.max);
                true
            }
            None => false,
        };

        let mut names: Vec<String> = model.intervals.keys().cloned().collect();
        names.sort();
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let n = names.len();

        let mut durations = Vec::with_capacity(n);
        let mut start_min = Vec::with_capacity(n);
        let mut start_max = Vec::with_capacity(n);
        let mut empty_window = false;
        for name in &names {
            let interval = &model.intervals[name];
            if interval.is_optional {
                return Err(EngineError::Unsupported(format!("optional interval {name}")));
            }
            let Some(d) = interval.duration.fixed else {
                return Err(EngineError::Unsupported(format!(
                    "variable duration of interval {name}"
                )));
            };
            let mut lo = interval.start.min.max(interval.end.min - d);
            let mut hi = interval
                .start
                .max
                .min(interval.end.max - d)
                .min(objective_max - d);
            if let Some(s) = interval.start.fixed {
                lo = lo.max(s);
                hi = hi.min(s);
            }
            if let Some(e) = interval.end.fixed {
                lo = lo.max(e - d);
                hi = hi.min(e - d);
            }
            empty_window |= lo > hi;
            durations.push(d);
            start_min.push(lo);
            start_max.push(hi);
        }

        let mut preds = vec![Vec::new(); n];
        let mut succs = vec![Vec::new(); n];
        let mut resources = Vec::new();
        let mut overloaded = false;

        // `validate` has checked every referenced name.
        let lookup = |name: &String| {
            index
                .get(name.as_str())
                .copied()
                .ok_or_else(|| EngineError::InvalidModel(format!("undefined interval: {name}")))
        };

        for constraint in &model.constraints {
            match constraint {
                Constraint::Precedence {
                    before,
                    after,
                    min_delay,
                } => {
                    if *min_delay < 0 {
                        return Err(EngineError::Unsupported(format!(
                            "negative delay between {before} and {after}"
                        )));
                    }
                    let (b, a) = (lookup(before)?, lookup(after)?);
                    let lag = durations[b] + min_delay;
                    preds[a].push((b, lag));
                    succs[b].push((a, lag));
                }
                Constraint::Cumulative {
                    intervals,
                    demands,
                    capacity,
                } => {
                    let mut per_interval = vec![0; n];
                    for (name, &demand) in intervals.iter().zip(demands) {
                        if demand < 0 {
                            return Err(EngineError::Unsupported(format!(
                                "negative demand of interval {name}"
                            )));
                        }
                        per_interval[lookup(name)?] += demand;
                    }
                    overloaded |= (0..n).any(|i| durations[i] > 0 && per_interval[i] > *capacity);
                    resources.push(CumulativeResource {
                        capacity: *capacity,
                        demands: per_interval,
                    });
                }
                Constraint::NoOverlap { intervals } => {
                    let mut per_interval = vec![0; n];
                    for name in intervals {
                        per_interval[lookup(name)?] = 1;
                    }
                    resources.push(CumulativeResource {
                        capacity: 1,
                        demands: per_interval,
                    });
                }
                other => {
                    return Err(EngineError::Unsupported(format!("constraint {other:?}")));
                }
            }
        }

        if empty_window || overloaded {
            return Ok(Compiled::Infeasible);
        }

        let Some(topo) = topological_order(&preds, &succs) else {
            return Ok(Compiled::Infeasible);
        };
        let mut rank = vec![0; n];
        for (pos, &i) in topo.iter().enumerate() {
            rank[i] = pos;
        }

        let mut tails = durations.clone();
        for &i in topo.iter().rev() {
            let longest = succs[i]
                .iter()
                .map(|&(s, lag)| lag + tails[s])
                .max()
                .unwrap_or(0);
            tails[i] = durations[i].max(longest);
        }

        Ok(Compiled::Network(Network {
            names,
            durations,
            preds,
            succs,
            start_min,
            start_max,
            topo,
            rank,
            tails,
            resources,
            objective_max,
            has_makespan_var,
        }))
    }

    /// Latest finish time relative to the objective bound.
    pub fn latest_finish(&self, i: usize) -> i64 {
        self.objective_max - self.tails[i] + self.durations[i]
    }

    /// Number of direct and indirect successors of every interval.
    pub fn total_successors(&self) -> Vec<usize> {
        let n = self.len();
        let mut seen = vec![usize::MAX; n];
        let mut stack = Vec::new();
        (0..n)
            .map(|root| {
                let mut count = 0;
                stack.clear();
                stack.push(root);
                while let Some(i) = stack.pop() {
                    for &(s, _) in &self.succs[i] {
                        if seen[s] != root {
                            seen[s] = root;
                            count += 1;
                            stack.push(s);
                        }
                    }
                }
                count
            })
            .collect()
    }

    /// Solution for a complete set of start times, and its makespan.
    pub fn solution(&self, starts: &[i64], status: SolverStatus) -> (CpSolution, i64) {
        let mut solution = CpSolution::empty(status);
        let mut makespan = 0;
        for (i, &start) in starts.iter().enumerate() {
            let duration = self.durations[i];
            let end = start + duration;
            solution.intervals.insert(
                self.names[i].clone(),
                IntervalSolution {
                    start,
                    end,
                    duration,
                    is_present: true,
                },
            );
            makespan = makespan.max(end);
        }
        if self.has_makespan_var {
            solution.int_vars.insert(MAKESPAN_VAR.to_string(), makespan);
        }
        solution.objective_value = Some(makespan as f64);
        (solution, makespan)
    }
}

/// Kahn's algorithm, smallest index first. `None` on a cycle.
pub(crate) fn topological_order(
    preds: &[Vec<(usize, i64)>],
    succs: &[Vec<(usize, i64)>],
) -> Option<Vec<usize>> {
    let n = preds.len();
    let mut pending: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| pending[i] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for &(s, _) in &succs[i] {
            pending[s] -= 1;
            if pending[s] == 0 {
                ready.push(Reverse(s));
            }
        }
    }

    (order.len() == n).then_some(order)
}
