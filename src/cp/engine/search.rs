//! Depth-first branch-and-bound over active schedules.
//!
//! # Algorithm
//! Each node places one precedence-eligible interval at its earliest
//! resource-feasible start. Every active schedule, listed by increasing
//! (start, topological rank), is produced by exactly one branch, so nodes
//! whose new interval would start before the previous one (or at the same
//! time with a lower rank) are skipped.
//!
//! A child is pruned when its lower bound reaches the incumbent. The bound
//! is the larger of:
//! - critical path: earliest start of every unplaced interval (all of them
//!   start no earlier than the last placed one) plus its tail
//! - energy: per resource, remaining work after the last start divided
//!   by capacity
//!
//! # References
//! - Demeulemeester & Herroelen (1992), "A Branch-and-Bound Procedure for
//!   the Multiple Resource-Constrained Project Scheduling Problem"
//! - Sprecher (2000), "Scheduling Resource-Constrained Projects Competitively
//!   at Modest Memory Requirements"

use std::time::Instant;

use super::network::Network;
use super::profile::Profile;

/// Child ordering at each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Branching {
    /// Interval declaration order.
    Declaration,
    /// Earliest start, then latest finish time, then index.
    EarliestStart,
}

/// Outcome of a search run.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchResult {
    /// Best start times and makespan, if any schedule was found.
    pub best: Option<(Vec<i64>, i64)>,
    /// The deadline stopped the search before it was exhausted.
    pub timed_out: bool,
    pub conflicts: u64,
    pub branches: u64,
}

pub(crate) struct Search<'a> {
    net: &'a Network,
    branching: Branching,
    deadline: Option<Instant>,
    profile: Profile,
    starts: Vec<i64>,
    placed: Vec<bool>,
    pending: Vec<usize>,
    est: Vec<i64>,
    /// Objective value a new schedule must beat.
    bound: i64,
    result: SearchResult,
}

impl<'a> Search<'a> {
    /// Creates a search seeded with an optional incumbent.
    pub fn new(
        net: &'a Network,
        branching: Branching,
        incumbent: Option<(Vec<i64>, i64)>,
        deadline: Option<Instant>,
    ) -> Self {
        let n = net.len();
        let bound = incumbent
            .as_ref()
            .map_or(net.objective_max + 1, |(_, makespan)| *makespan);
        Self {
            net,
            branching,
            deadline,
            profile: Profile::new(net),
            starts: vec![0; n],
            placed: vec![false; n],
            pending: net.preds.iter().map(Vec::len).collect(),
            est: vec![0; n],
            bound,
            result: SearchResult {
                best: incumbent,
                ..Default::default()
            },
        }
    }

    /// Runs the search to completion or until the deadline.
    pub fn run(mut self) -> SearchResult {
        let n = self.net.len();
        if n == 0 {
            if self.result.best.is_none() && self.bound > 0 {
                self.result.best = Some((Vec::new(), 0));
            }
            return self.result;
        }

        let root = self.net.start_min.iter().copied().min().unwrap_or(0);
        if self.lower_bound(root, 0) < self.bound {
            self.descend(0, root, None, 0);
        } else {
            self.result.conflicts += 1;
        }
        self.result
    }

    fn descend(&mut self, depth: usize, last_start: i64, last_rank: Option<usize>, max_end: i64) {
        if self.result.timed_out {
            return;
        }
        if let Some(deadline) = self.deadline {
            if self.result.branches % 256 == 0 && Instant::now() >= deadline {
                self.result.timed_out = true;
                return;
            }
        }

        let net = self.net;
        if depth == net.len() {
            if max_end < self.bound {
                self.bound = max_end;
                self.result.best = Some((self.starts.clone(), max_end));
            }
            return;
        }

        let mut children = Vec::new();
        for i in 0..net.len() {
            if self.placed[i] || self.pending[i] > 0 {
                continue;
            }
            let ready = net.preds[i]
                .iter()
                .map(|&(p, lag)| self.starts[p] + lag)
                .fold(net.start_min[i], i64::max);
            let Some(start) = self.profile.earliest_start(net, i, ready, net.start_max[i]) else {
                // Later placements only delay it further.
                self.result.conflicts += 1;
                return;
            };
            let canonical = match last_rank {
                None => true,
                Some(rank) => start > last_start || (start == last_start && net.rank[i] > rank),
            };
            if canonical {
                children.push((i, start));
            }
        }

        if self.branching == Branching::EarliestStart {
            children.sort_by_key(|&(i, start)| (start, net.latest_finish(i), i));
        }

        for (i, start) in children {
            self.result.branches += 1;
            self.place(i, start);
            let end = max_end.max(start + net.durations[i]);
            if self.lower_bound(start, end) < self.bound {
                self.descend(depth + 1, start, Some(net.rank[i]), end);
            } else {
                self.result.conflicts += 1;
            }
            self.unplace(i);
            if self.result.timed_out {
                return;
            }
        }
    }

    fn place(&mut self, i: usize, start: i64) {
        self.profile.place(self.net, i, start);
        self.starts[i] = start;
        self.placed[i] = true;
        for &(s, _) in &self.net.succs[i] {
            self.pending[s] -= 1;
        }
    }

    fn unplace(&mut self, i: usize) {
        self.profile.remove(i);
        self.placed[i] = false;
        for &(s, _) in &self.net.succs[i] {
            self.pending[s] += 1;
        }
    }

    /// Lower bound on the makespan of any completion of the current node,
    /// given that no unplaced interval starts before `last_start`.
    fn lower_bound(&mut self, last_start: i64, max_end: i64) -> i64 {
        let net = self.net;
        let mut bound = max_end;

        for &i in &net.topo {
            if self.placed[i] {
                continue;
            }
            let est = net.preds[i]
                .iter()
                .map(|&(p, lag)| {
                    if self.placed[p] {
                        self.starts[p] + lag
                    } else {
                        self.est[p] + lag
                    }
                })
                .fold(net.start_min[i].max(last_start), i64::max);
            self.est[i] = est;
            bound = bound.max(est + net.tails[i]);
        }

        for resource in &net.resources {
            if resource.capacity <= 0 {
                continue;
            }
            let energy: i64 = (0..net.len())
                .map(|i| {
                    let q = resource.demands[i];
                    if q == 0 {
                        0
                    } else if self.placed[i] {
                        q * (self.starts[i] + net.durations[i] - last_start).max(0)
                    } else {
                        q * net.durations[i]
                    }
                })
                .sum();
            if energy > 0 {
                let span = (energy + resource.capacity - 1) / resource.capacity;
                bound = bound.max(last_start + span);
            }
        }

        bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::build_model;
    use crate::cp::engine::network::Compiled;
    use crate::models::{ProjectDescription, Resource, Task};

    fn network(project: &ProjectDescription) -> Network {
        let built = build_model(project).unwrap();
        match Network::compile(&built.model).unwrap() {
            Compiled::Network(net) => net,
            Compiled::Infeasible => panic!("unexpected infeasible"),
        }
    }

    /// Task 3 claims the whole resource, so it cannot overlap the chain
    /// 1 -> 2 and the optimum is 8.
    fn tricky() -> ProjectDescription {
        ProjectDescription::new(
            50,
            vec![
                Task::new(1, 2).with_demand("R1", 1).with_successor(2),
                Task::new(2, 4).with_demand("R1", 1),
                Task::new(3, 2).with_demand("R1", 2),
            ],
            vec![Resource::new("R1", 2)],
        )
        .unwrap()
    }

    #[test]
    fn test_chain_optimum() {
        let project = ProjectDescription::new(
            20,
            vec![
                Task::new(1, 3).with_demand("R1", 1).with_successor(2),
                Task::new(2, 4).with_demand("R1", 1).with_successor(3),
                Task::new(3, 2).with_demand("R1", 1),
            ],
            vec![Resource::new("R1", 1)],
        )
        .unwrap();
        let net = network(&project);
        let result = Search::new(&net, Branching::Declaration, None, None).run();
        let (starts, makespan) = result.best.unwrap();
        assert_eq!(makespan, 9);
        assert_eq!(starts, vec![0, 3, 7]);
        assert!(!result.timed_out);
    }

    #[test]
    fn test_both_branchings_agree() {
        let net = network(&tricky());
        let fixed = Search::new(&net, Branching::Declaration, None, None).run();
        let auto = Search::new(&net, Branching::EarliestStart, None, None).run();
        assert_eq!(fixed.best.as_ref().unwrap().1, 8);
        assert_eq!(auto.best.as_ref().unwrap().1, 8);
        assert!(fixed.branches > 0);
    }

    #[test]
    fn test_incumbent_is_kept_when_optimal() {
        let net = network(&tricky());
        let seed = Some((vec![0, 2, 8], 10));
        let result = Search::new(&net, Branching::EarliestStart, seed, None).run();
        assert_eq!(result.best.unwrap().1, 8);

        // An optimal incumbent is never replaced by an equal schedule.
        let optimal = Some((vec![0, 2, 6], 8));
        let result = Search::new(&net, Branching::EarliestStart, optimal.clone(), None).run();
        assert_eq!(result.best, optimal);
    }

    #[test]
    fn test_infeasible_horizon() {
        let project = ProjectDescription::new(
            7,
            vec![
                Task::new(1, 5).with_demand("R1", 2),
                Task::new(2, 3).with_demand("R1", 2),
            ],
            vec![Resource::new("R1", 2)],
        )
        .unwrap();
        let net = network(&project);
        let result = Search::new(&net, Branching::EarliestStart, None, None).run();
        assert!(result.best.is_none());
        assert!(!result.timed_out);
    }

    #[test]
    fn test_expired_deadline() {
        let net = network(&tricky());
        let result = Search::new(&net, Branching::Declaration, None, Some(Instant::now())).run();
        assert!(result.timed_out);
        assert!(result.best.is_none());
    }
}
