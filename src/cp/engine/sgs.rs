//! Serial schedule generation with priority rules.
//!
//! Builds one complete schedule by repeatedly taking the eligible interval
//! with the best priority and placing it at its earliest feasible start.
//! Used to seed the branch-and-bound incumbent.
//!
//! # Score Convention
//! Lower priority value = scheduled first. Ties go to the lower index.
//!
//! # References
//! - Kolisch (1996), "Serial and parallel resource-constrained project
//!   scheduling methods revisited: Theory and computation"
//! - Kolisch & Hartmann (1999), "Heuristic Algorithms for the RCPSP", Sec. 3

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::network::Network;
use super::profile::Profile;

/// Priority rules for serial schedule generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PriorityRule {
    /// Latest Finish Time.
    Lft,
    /// Latest Start Time.
    Lst,
    /// Most Total Successors.
    Mts,
    /// Greatest Rank Positional Weight: own duration plus direct successors'.
    Grpw,
    /// Shortest Processing Time.
    Spt,
}

impl PriorityRule {
    pub const ALL: [PriorityRule; 5] = [
        PriorityRule::Lft,
        PriorityRule::Lst,
        PriorityRule::Mts,
        PriorityRule::Grpw,
        PriorityRule::Spt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PriorityRule::Lft => "LFT",
            PriorityRule::Lst => "LST",
            PriorityRule::Mts => "MTS",
            PriorityRule::Grpw => "GRPW",
            PriorityRule::Spt => "SPT",
        }
    }

    /// Priority value of every interval.
    pub fn priorities(&self, net: &Network) -> Vec<f64> {
        let n = net.len();
        match self {
            PriorityRule::Lft => (0..n).map(|i| net.latest_finish(i) as f64).collect(),
            PriorityRule::Lst => (0..n)
                .map(|i| (net.latest_finish(i) - net.durations[i]) as f64)
                .collect(),
            PriorityRule::Mts => net
                .total_successors()
                .into_iter()
                .map(|count| -(count as f64))
                .collect(),
            PriorityRule::Grpw => (0..n)
                .map(|i| {
                    let weight: i64 = net.durations[i]
                        + net.succs[i].iter().map(|&(s, _)| net.durations[s]).sum::<i64>();
                    -(weight as f64)
                })
                .collect(),
            PriorityRule::Spt => net.durations.iter().map(|&d| d as f64).collect(),
        }
    }
}

/// LFT priorities perturbed by uniform noise, one vector per pass.
///
/// Noise spans the longest duration so that near-critical intervals can
/// swap places while the rule's overall order survives.
pub(crate) fn randomized_priorities(net: &Network, seed: u64, passes: usize) -> Vec<Vec<f64>> {
    let base = PriorityRule::Lft.priorities(net);
    let spread = net.durations.iter().copied().max().unwrap_or(0) as f64 + 1.0;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..passes)
        .map(|_| {
            base.iter()
                .map(|&p| p + rng.random_range(0.0..spread))
                .collect()
        })
        .collect()
}

/// Runs one serial schedule generation pass.
///
/// Returns start times and makespan, or `None` if some interval cannot be
/// placed inside its time window.
pub(crate) fn serial_schedule(net: &Network, priorities: &[f64]) -> Option<(Vec<i64>, i64)> {
    let n = net.len();
    let mut profile = Profile::new(net);
    let mut starts = vec![0; n];
    let mut done = vec![false; n];
    let mut pending: Vec<usize> = net.preds.iter().map(Vec::len).collect();
    let mut makespan = 0;

    for _ in 0..n {
        let next = (0..n)
            .filter(|&i| !done[i] && pending[i] == 0)
            .min_by(|&a, &b| priorities[a].total_cmp(&priorities[b]).then(a.cmp(&b)))?;

        let ready = net.preds[next]
            .iter()
            .map(|&(p, lag)| starts[p] + lag)
            .fold(net.start_min[next], i64::max);
        let start = profile.earliest_start(net, next, ready, net.start_max[next])?;

        profile.place(net, next, start);
        starts[next] = start;
        done[next] = true;
        makespan = makespan.max(start + net.durations[next]);
        for &(s, _) in &net.succs[next] {
            pending[s] -= 1;
        }
    }

    Some((starts, makespan))
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

    /// 1 -> {2, 3}; 2 is long and critical, 3 is short. Capacity 1.
    fn fork() -> ProjectDescription {
        ProjectDescription::new(
            30,
            vec![
                Task::new(1, 1).with_demand("R1", 1).with_successors([2, 3]),
                Task::new(2, 5).with_demand("R1", 1).with_successor(4),
                Task::new(3, 2).with_demand("R1", 1),
                Task::new(4, 4).with_demand("R1", 1),
            ],
            vec![Resource::new("R1", 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_serial_schedule_is_serial_under_unit_capacity() {
        let net = network(&fork());
        let (starts, makespan) = serial_schedule(&net, &PriorityRule::Lft.priorities(&net)).unwrap();
        assert_eq!(makespan, 12);
        assert_eq!(starts[0], 0);
        // LFT puts the critical task 2 before task 3
        assert_eq!(starts[1], 1);
    }

    #[test]
    fn test_every_rule_yields_a_schedule() {
        let net = network(&fork());
        for rule in PriorityRule::ALL {
            let result = serial_schedule(&net, &rule.priorities(&net));
            assert!(result.is_some(), "{} failed", rule.name());
            assert_eq!(result.unwrap().1, 12);
        }
    }

    #[test]
    fn test_rule_priorities() {
        let net = network(&fork());
        assert_eq!(PriorityRule::Spt.priorities(&net), vec![1.0, 5.0, 2.0, 4.0]);
        assert_eq!(PriorityRule::Mts.priorities(&net), vec![-3.0, -1.0, 0.0, 0.0]);
        assert_eq!(PriorityRule::Grpw.priorities(&net), vec![-8.0, -9.0, -2.0, -4.0]);
        let lft = PriorityRule::Lft.priorities(&net);
        assert!(lft[1] < lft[2]);
    }

    #[test]
    fn test_randomized_priorities_are_seeded() {
        let net = network(&fork());
        let a = randomized_priorities(&net, 7, 3);
        let b = randomized_priorities(&net, 7, 3);
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_horizon_too_short() {
        let project = ProjectDescription::new(
            6,
            vec![
                Task::new(1, 4).with_demand("R1", 1),
                Task::new(2, 4).with_demand("R1", 1),
            ],
            vec![Resource::new("R1", 1)],
        )
        .unwrap();
        let net = network(&project);
        assert!(serial_schedule(&net, &PriorityRule::Lft.priorities(&net)).is_none());
    }
}
