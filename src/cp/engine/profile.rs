//! Event-based resource usage profile.
//!
//! Keeps the placed intervals of every resource instead of a per-time-unit
//! table, so memory and time depend on the number of intervals only, never
//! on the horizon or the durations.

use super::network::Network;

#[derive(Debug, Clone, Copy)]
struct Placed {
    interval: usize,
    start: i64,
    end: i64,
    demand: i64,
}

/// Intervals currently holding each resource.
#[derive(Debug, Clone)]
pub(crate) struct Profile {
    placed: Vec<Vec<Placed>>,
}

impl Profile {
    pub fn new(net: &Network) -> Self {
        Self {
            placed: vec![Vec::new(); net.resources.len()],
        }
    }

    /// Earliest start in `[from, latest]` at which interval `i` fits
    /// every resource for its whole duration.
    pub fn earliest_start(&self, net: &Network, i: usize, from: i64, latest: i64) -> Option<i64> {
        let d = net.durations[i];
        if d > 0 && net.resources.iter().any(|r| r.demands[i] > r.capacity) {
            return None;
        }
        let mut s = from;
        while s <= latest {
            if d == 0 {
                return Some(s);
            }
            match self.blocked_until(net, i, s) {
                None => return Some(s),
                Some(next) => s = next,
            }
        }
        None
    }

    /// `None` if interval `i` fits at `s`. Otherwise the next start worth
    /// trying: the earliest end among the intervals running at a time
    /// point where capacity is exceeded.
    fn blocked_until(&self, net: &Network, i: usize, s: i64) -> Option<i64> {
        let end = s + net.durations[i];
        for (r, resource) in net.resources.iter().enumerate() {
            let q = resource.demands[i];
            if q == 0 {
                continue;
            }
            let placed = &self.placed[r];
            // Usage over [s, end) peaks at s or at a placed start inside it.
            let checkpoints = std::iter::once(s).chain(
                placed
                    .iter()
                    .map(|p| p.start)
                    .filter(|&t| s < t && t < end),
            );
            for t in checkpoints {
                let running = placed.iter().filter(|p| p.start <= t && t < p.end);
                let usage: i64 = running.clone().map(|p| p.demand).sum();
                if usage + q > resource.capacity {
                    return Some(running.map(|p| p.end).min().unwrap_or(t + 1));
                }
            }
        }
        None
    }

    pub fn place(&mut self, net: &Network, i: usize, start: i64) {
        let end = start + net.durations[i];
        if end == start {
            return;
        }
        for (r, resource) in net.resources.iter().enumerate() {
            let demand = resource.demands[i];
            if demand > 0 {
                self.placed[r].push(Placed {
                    interval: i,
                    start,
                    end,
                    demand,
                });
            }
        }
    }

    pub fn remove(&mut self, i: usize) {
        for placed in &mut self.placed {
            if let Some(pos) = placed.iter().rposition(|p| p.interval == i) {
                placed.swap_remove(pos);
            }
        }
    }
}
