/*
longest_path.rs

Copyright 2025 Hervé Quatremain

This file is part of Tilechain.

Tilechain is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Tilechain is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Tilechain. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Search for the longest chain of tiles.
//!
//! Finding the longest simple path in a directed graph is NP-hard. The search is a time-bounded
//! depth-first exploration that returns the best chain found before the deadline.
//!
//! For each starting tile, in registry order, an explicit stack of `(tile, chain)` entries is
//! explored. A depth memo, shared by all the starting tiles, records the longest chain length at
//! which each tile has been reached. A tile that was already reached from the current starting
//! tile is not explored again unless the new chain is longer than the memo.
//!
//! Successors are pushed in reverse order so that they are popped in graph order. When several
//! chains share the maximum length, the first one discovered in that order is returned.
//!
//! The shared memo can prevent a later branch from being explored even when it would lead to a
//! longer chain, so the result is a best effort even when the deadline is not reached.

use log::{debug, info};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use super::clock::Deadline;
use super::edges::Connections;
use super::path::Chain;
use crate::config::PROGRESS_INTERVAL_SEC;

/// Upper bound for the operation estimate.
const MAX_ESTIMATED_OPERATIONS: u64 = 100_000_000;

/// Maximum chain depth used in the operation estimate.
const ESTIMATE_MAX_DEPTH: usize = 30;

/// Number of rate samples used to smooth the reported performance.
const RATE_SAMPLES: usize = 5;

/// Counters collected during a search.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchStats {
    /// Number of stack entries that were explored.
    pub operations: u64,

    /// Number of starting tiles for which the exploration started.
    pub processed_starts: usize,

    /// Number of explored chains with the final best length.
    pub best_length_hits: usize,

    /// Successive best lengths, in the order they were found.
    pub improvements: Vec<usize>,

    /// Time spent searching.
    pub duration: Duration,

    /// Whether the search stopped because the deadline was reached.
    pub timed_out: bool,

    /// Whether a chain with all the tiles was found.
    pub perfect: bool,
}

/// Result of a search: the best chain and the search counters.
#[derive(Debug, Default, Clone)]
pub struct SearchOutcome {
    pub chain: Chain,
    pub stats: SearchStats,
}

/// How the exploration from a starting tile ended.
#[derive(Debug, PartialEq)]
enum Exploration {
    /// All the reachable chains were explored.
    Exhausted,

    /// A chain with all the tiles was found.
    Perfect,

    /// The deadline was reached.
    DurationExceeded,
}

/// Estimate the maximum number of operations for a graph.
///
/// With `N` tiles, `C` connections per tile, and `D` the number of tiles capped at 30, the
/// estimate is `N * C^D` when `C > 1`, and `N * N * 10` otherwise.
pub fn estimate_operations(num_tiles: usize, num_connections: usize) -> u64 {
    if num_tiles == 0 {
        return 0;
    }
    let n: f64 = num_tiles as f64;
    let c: f64 = num_connections as f64 / n;
    let d: i32 = num_tiles.min(ESTIMATE_MAX_DEPTH) as i32;
    let estimate: f64 = if c > 1.0 {
        n * c.powi(d)
    } else {
        n * n * 10.0
    };
    estimate.min(MAX_ESTIMATED_OPERATIONS as f64) as u64
}

/// Find the longest chain in the graph before the deadline.
///
/// `num_tiles` is the number of tiles in the registry: a chain of that length cannot be improved
/// and stops the search immediately.
pub fn find_longest_chain(
    connections: &Connections,
    num_tiles: usize,
    deadline: &Deadline,
) -> SearchOutcome {
    LongestPath::new(connections, num_tiles).run(deadline)
}

/// [`LongestPath`] object.
pub struct LongestPath<'a> {
    /// Graph to explore.
    connections: &'a Connections,

    /// Number of tiles in the registry.
    num_tiles: usize,

    /// Best chain found so far.
    best: Chain,

    /// For each tile, the longest chain length at which the tile has been reached.
    depth_memo: Vec<usize>,

    /// Counters.
    stats: SearchStats,

    /// Elapsed time of the last progress report.
    last_report: Duration,

    /// Last operation rates, used to smooth the reported performance.
    rates: VecDeque<f64>,
}

impl<'a> LongestPath<'a> {
    /// Create the object.
    pub fn new(connections: &'a Connections, num_tiles: usize) -> Self {
        Self {
            connections,
            num_tiles,
            best: Chain::new(),
            depth_memo: vec![0; connections.num_tiles()],
            stats: SearchStats::default(),
            last_report: Duration::ZERO,
            rates: VecDeque::with_capacity(RATE_SAMPLES + 1),
        }
    }

    /// Explore the graph and return the best chain found before the deadline.
    pub fn run(mut self, deadline: &Deadline) -> SearchOutcome {
        let num_starts: usize = self.connections.num_tiles();
        let num_connections: usize = self.connections.num_connections();

        info!(
            "Starting search with {:.2} second timeout...",
            deadline.timeout().as_secs_f64()
        );
        info!(
            "Graph parameters: N={} nodes, C={:.2} connections/node, D={} (max depth used in estimate)",
            num_starts,
            if num_starts > 0 {
                num_connections as f64 / num_starts as f64
            } else {
                0.0
            },
            num_starts.min(ESTIMATE_MAX_DEPTH)
        );
        info!(
            "Estimated max operations: {}",
            estimate_operations(num_starts, num_connections)
        );

        for start in 0..num_starts {
            if deadline.expired() {
                info!(
                    "Timeout reached after {:.2} seconds",
                    deadline.timeout().as_secs_f64()
                );
                self.stats.timed_out = true;
                break;
            }
            self.stats.processed_starts += 1;

            match self.explore_from(start, deadline) {
                Exploration::Exhausted => (),
                Exploration::Perfect => {
                    info!("Perfect chain found! Ending search early.");
                    self.stats.perfect = true;
                    break;
                }
                Exploration::DurationExceeded => {
                    info!(
                        "Timeout reached after {:.2} seconds",
                        deadline.timeout().as_secs_f64()
                    );
                    self.stats.timed_out = true;
                    break;
                }
            }
        }

        self.stats.duration = deadline.elapsed();
        let secs: f64 = self.stats.duration.as_secs_f64();
        info!(
            "Max path length: {} tiles (found {} times)",
            self.best.len(),
            self.stats.best_length_hits
        );
        info!(
            "Operations: {}. Time: {:.2} seconds. Ops/s: {:.0}",
            self.stats.operations,
            secs,
            if secs > 0.0 {
                self.stats.operations as f64 / secs
            } else {
                0.0
            }
        );
        info!(
            "Processed {}/{} starting nodes",
            self.stats.processed_starts, num_starts
        );

        SearchOutcome {
            chain: self.best,
            stats: self.stats,
        }
    }

    /// Explore all the chains that begin with the given tile.
    fn explore_from(&mut self, start: usize, deadline: &Deadline) -> Exploration {
        let mut stack: Vec<(usize, Chain)> = vec![(start, Chain::starting_at(start))];
        let mut visited: HashSet<usize> = HashSet::new();

        debug!("== Starting from tile {start}");
        while let Some((current, chain)) = stack.pop() {
            let depth: usize = chain.len();

            // Already reached from this starting tile with an equal or longer chain
            if visited.contains(&current) && depth <= self.depth_memo[current] {
                continue;
            }
            visited.insert(current);
            self.depth_memo[current] = self.depth_memo[current].max(depth);
            self.stats.operations += 1;

            if self.record(&chain) {
                return Exploration::Perfect;
            }

            let elapsed: Duration = deadline.elapsed();
            if elapsed >= deadline.timeout() {
                return Exploration::DurationExceeded;
            }
            self.report_progress(elapsed, deadline.timeout());

            // A chain cannot be longer than the number of tiles
            let remaining: usize = self.num_tiles.saturating_sub(depth);
            if depth + remaining <= self.best.len() {
                continue;
            }
            for &next in self.connections.successors(current).iter().rev() {
                if !chain.contains(next) {
                    stack.push((next, chain.extended(next)));
                }
            }
        }
        Exploration::Exhausted
    }

    /// Compare the chain with the best chain so far and keep it if it is longer.
    ///
    /// Return `true` when the best chain contains all the tiles.
    fn record(&mut self, chain: &Chain) -> bool {
        if chain.len() > self.best.len() {
            self.best = chain.clone();
            self.stats.best_length_hits = 1;
            self.stats.improvements.push(chain.len());
            debug!(
                "    New best chain: {} tiles after {} operations",
                chain.len(),
                self.stats.operations
            );
            return self.best.len() == self.num_tiles;
        }
        if chain.len() == self.best.len() {
            self.stats.best_length_hits += 1;
        }
        false
    }

    /// Log the progress of the search every few seconds.
    fn report_progress(&mut self, elapsed: Duration, timeout: Duration) {
        if elapsed.saturating_sub(self.last_report) <= Duration::from_secs(PROGRESS_INTERVAL_SEC) {
            return;
        }
        self.last_report = elapsed;

        let secs: f64 = elapsed.as_secs_f64();
        self.rates
            .push_back(self.stats.operations as f64 / secs.max(f64::EPSILON));
        if self.rates.len() > RATE_SAMPLES {
            self.rates.pop_front();
        }
        let average: f64 = self.rates.iter().sum::<f64>() / self.rates.len() as f64;

        info!("Operations: {}", self.stats.operations);
        info!("Performance: {average:.0} ops/sec");
        info!(
            "Best chain length: {} tiles (found {} times)",
            self.best.len(),
            self.stats.best_length_hits
        );
        info!(
            "Time: {secs:.1}s elapsed, {:.1}% of timeout used",
            secs / timeout.as_secs_f64().max(f64::EPSILON) * 100.0
        );
        info!(
            "Processed {}/{} starting nodes",
            self.stats.processed_starts,
            self.connections.num_tiles()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::clock::StepClock;
    use crate::finder::tiles::TileRegistry;
    use pretty_assertions::assert_eq;

    fn registry(codes: &[&str]) -> TileRegistry {
        let mut registry: TileRegistry = TileRegistry::new();
        for code in codes {
            registry.add(code).unwrap();
        }
        registry
    }

    /// Search with a clock that never advances, so the deadline is never reached.
    fn search(registry: &TileRegistry) -> SearchOutcome {
        let connections: Connections = Connections::build(registry.all());
        let clock: StepClock = StepClock::frozen();
        let deadline: Deadline = Deadline::new(&clock, Duration::from_secs(60));
        find_longest_chain(&connections, registry.len(), &deadline)
    }

    fn assert_connected(registry: &TileRegistry, chain: &Chain) {
        for pair in chain.ids().windows(2) {
            let from = registry.get(pair[0]).unwrap();
            let to = registry.get(pair[1]).unwrap();
            assert!(from.connects_to(to), "{} does not lead to {}", from.code, to.code);
        }
        let mut ids: Vec<usize> = chain.ids().to_vec();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), chain.len(), "duplicated tiles in {:?}", chain.ids());
        assert!(chain.len() <= registry.len());
    }

    #[test]
    fn linear_chain_is_found_in_order() {
        let r: TileRegistry = registry(&["104211", "114212", "124213", "134214", "144215"]);
        let outcome: SearchOutcome = search(&r);

        assert_eq!(outcome.chain.ids(), &[0, 1, 2, 3, 4]);
        assert!(outcome.stats.perfect);
        assert!(!outcome.stats.timed_out);
        assert_eq!(outcome.stats.processed_starts, 1);
    }

    #[test]
    fn longest_branch_wins() {
        let r: TileRegistry = registry(&[
            "104211", "114212", "124213", // main chain
            "114299", "994288", // branch of two tiles from 11
            "124277", "774266", "664255", // branch of three tiles from 12
        ]);
        let outcome: SearchOutcome = search(&r);

        assert_eq!(outcome.chain.ids(), &[0, 1, 5, 6, 7]);
        assert!(!outcome.stats.perfect);
        assert_eq!(outcome.stats.processed_starts, r.len());
        assert_connected(&r, &outcome.chain);
    }

    #[test]
    fn branch_replacing_a_tile_of_the_linear_chain() {
        let r: TileRegistry = registry(&[
            "104211", "114212", "124213", "144215", "124277", "774266", "664255",
        ]);
        let outcome: SearchOutcome = search(&r);

        // 10 -> 11 -> 12 -> 77 -> 66 -> 55, the 12 -> 13 branch stops after one tile
        assert_eq!(outcome.chain.ids(), &[0, 1, 4, 5, 6]);
        assert_connected(&r, &outcome.chain);
    }

    #[test]
    fn cycle_terminates_with_all_tiles() {
        let r: TileRegistry = registry(&["104211", "114212", "124210"]);
        let outcome: SearchOutcome = search(&r);

        assert_eq!(outcome.chain.ids(), &[0, 1, 2]);
        assert!(outcome.stats.perfect);
        assert_connected(&r, &outcome.chain);
    }

    #[test]
    fn empty_registry_gives_empty_chain() {
        let outcome: SearchOutcome = search(&TileRegistry::new());

        assert!(outcome.chain.is_empty());
        assert_eq!(outcome.stats.operations, 0);
        assert_eq!(outcome.stats.processed_starts, 0);
        assert!(!outcome.stats.timed_out);
    }

    #[test]
    fn isolated_tile_is_a_chain_of_one() {
        let r: TileRegistry = registry(&["123456"]);
        let outcome: SearchOutcome = search(&r);

        assert_eq!(outcome.chain.ids(), &[0]);
        assert!(outcome.stats.perfect);
    }

    #[test]
    fn first_discovered_chain_wins_ties() {
        // Two chains of two tiles: 10 -> 11 -> 12 and 20 -> 21 -> 22
        let r: TileRegistry = registry(&["204221", "214222", "104211", "114212"]);
        let outcome: SearchOutcome = search(&r);

        assert_eq!(outcome.chain.ids(), &[0, 1]);
        assert_eq!(outcome.stats.best_length_hits, 2);
    }

    #[test]
    fn successors_are_explored_in_graph_order() {
        // Both 11 -> 12 and 11 -> 13 lead to a chain of the same length
        let r: TileRegistry = registry(&["104211", "114212", "114213"]);
        let outcome: SearchOutcome = search(&r);

        assert_eq!(outcome.chain.ids(), &[0, 1]);
    }

    #[test]
    fn identical_inputs_give_identical_chains() {
        let codes: [&str; 10] = [
            "104211", "114212", "124210", "114299", "994211", "124277", "774212", "664255",
            "554266", "104277",
        ];
        let first: SearchOutcome = search(&registry(&codes));
        let second: SearchOutcome = search(&registry(&codes));

        assert_eq!(first.chain, second.chain);
        assert_eq!(first.stats.operations, second.stats.operations);
    }

    #[test]
    fn zero_timeout_returns_immediately() {
        let r: TileRegistry = registry(&["104211", "114212", "124213"]);
        let connections: Connections = Connections::build(r.all());
        let clock: StepClock = StepClock::frozen();
        let deadline: Deadline = Deadline::new(&clock, Duration::ZERO);
        let outcome: SearchOutcome = find_longest_chain(&connections, r.len(), &deadline);

        assert!(outcome.chain.is_empty());
        assert!(outcome.stats.timed_out);
        assert_eq!(outcome.stats.processed_starts, 0);
    }

    #[test]
    fn timeout_keeps_the_best_chain_so_far() {
        let r: TileRegistry = registry(&["104211", "114212", "124213", "134214", "144215"]);
        let connections: Connections = Connections::build(r.all());

        // Clock readings: 0s before the first start, then 1s and 2s after the first two
        // explored entries. The deadline is reached after the second entry.
        let clock: StepClock = StepClock::new(Duration::from_secs(1));
        let deadline: Deadline = Deadline::new(&clock, Duration::from_secs(2));
        let outcome: SearchOutcome = find_longest_chain(&connections, r.len(), &deadline);

        assert_eq!(outcome.chain.ids(), &[0, 1]);
        assert!(outcome.stats.timed_out);
        assert!(!outcome.stats.perfect);
        assert_eq!(outcome.stats.operations, 2);
    }

    #[test]
    fn perfect_chain_stops_before_the_deadline() {
        let r: TileRegistry = registry(&["124210", "104211", "114212"]);
        let connections: Connections = Connections::build(r.all());
        let clock: StepClock = StepClock::new(Duration::from_secs(1));
        let deadline: Deadline = Deadline::new(&clock, Duration::from_secs(100));
        let outcome: SearchOutcome = find_longest_chain(&connections, r.len(), &deadline);

        assert_eq!(outcome.chain.ids(), &[0, 1, 2]);
        assert!(outcome.stats.perfect);
        assert!(!outcome.stats.timed_out);
        assert!(outcome.stats.duration < Duration::from_secs(100));
    }

    #[test]
    fn best_length_never_decreases() {
        let r: TileRegistry = registry(&[
            "104211", "114212", "124213", "114299", "994288", "124277", "774266", "664255",
            "554210", "884211",
        ]);
        let outcome: SearchOutcome = search(&r);

        let improvements: &[usize] = &outcome.stats.improvements;
        assert!(!improvements.is_empty());
        assert!(improvements.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(improvements.last().copied(), Some(outcome.chain.len()));
        assert_connected(&r, &outcome.chain);
    }

    #[test]
    fn estimate_depends_on_the_connection_density() {
        assert_eq!(estimate_operations(0, 0), 0);
        // C = 0.8: N * N * 10
        assert_eq!(estimate_operations(5, 4), 250);
        // C = 2, D = 4: 4 * 2^4
        assert_eq!(estimate_operations(4, 8), 64);
        // Capped
        assert_eq!(estimate_operations(1000, 5000), MAX_ESTIMATED_OPERATIONS);
    }
}
