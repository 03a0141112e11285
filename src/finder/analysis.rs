/*
analysis.rs

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

//! Analyze a chain after the search.
//!
//! The analysis reports the unused tiles, the unused tiles that could extend the chain at either
//! end, and the branching points: positions where other tiles could have followed.

use log::{info, warn};
use std::collections::HashSet;

use super::edges::Connections;
use super::tiles::{Tile, TileRegistry};
use super::validation::{self, ChainValidation};

/// Number of branching points and samples to report.
const REPORT_TOP: usize = 10;

/// Longest chain listing displayed in full.
const LISTING_FULL_MAX: usize = 20;

/// Number of entries displayed at each end of a longer listing.
const LISTING_ENDS: usize = 5;

/// Position in a chain where other tiles could have followed.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchingPoint {
    /// Position of the tile in the chain, starting at 0.
    pub position: usize,

    /// Tile at that position.
    pub tile_id: usize,

    /// Tile that follows in the chain.
    pub used_next: usize,

    /// Other tiles that could have followed.
    pub alternatives: Vec<usize>,
}

/// Analysis report.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainAnalysis {
    /// Number of tiles in the registry.
    pub total_tiles: usize,

    /// Number of tiles in the chain.
    pub chain_length: usize,

    /// Result of the chain verification.
    pub validation: ChainValidation,

    /// Number of distinct tiles in the chain.
    pub used: usize,

    /// Tiles that are not in the chain, in registry order.
    pub unused: Vec<usize>,

    /// Unused tiles that give what the first tile of the chain takes.
    pub extend_front: Vec<usize>,

    /// Unused tiles that take what the last tile of the chain gives.
    pub extend_back: Vec<usize>,

    /// Branching points in chain order.
    pub branching_points: Vec<BranchingPoint>,

    /// Tile codes joined with dots.
    pub dotted: String,

    /// Expected minimum chain length, if any.
    pub min_length: Option<usize>,

    /// One `(takes → gives) - id - (takes → gives)` entry per tile of the chain.
    pub listing: Vec<String>,
}

impl ChainAnalysis {
    /// Whether the used and unused counts add up to the number of tiles.
    pub fn counts_match(&self) -> bool {
        self.used + self.unused.len() == self.total_tiles
    }

    /// Whether the chain reaches the expected minimum length.
    pub fn meets_min_length(&self) -> bool {
        self.min_length.is_none_or(|min| self.chain_length >= min)
    }

    /// Return the listing entries to display with their index.
    ///
    /// Long listings only keep both ends, and [`None`] stands for the skipped entries.
    pub fn listing_excerpt(&self) -> Vec<Option<(usize, &str)>> {
        let n: usize = self.listing.len();
        let end: usize = if n > LISTING_FULL_MAX { LISTING_ENDS } else { n };

        let mut excerpt: Vec<Option<(usize, &str)>> = self.listing[..end]
            .iter()
            .enumerate()
            .map(|(i, e)| Some((i, e.as_str())))
            .collect();
        if end < n {
            let tail: usize = n - LISTING_ENDS;
            excerpt.push(None);
            excerpt.extend(
                self.listing[tail..]
                    .iter()
                    .enumerate()
                    .map(|(i, e)| Some((tail + i, e.as_str()))),
            );
        }
        excerpt
    }

    /// Return the branching points with the most alternatives first.
    pub fn top_branching_points(&self) -> Vec<&BranchingPoint> {
        let mut points: Vec<&BranchingPoint> = self.branching_points.iter().collect();
        points.sort_by(|a, b| b.alternatives.len().cmp(&a.alternatives.len()));
        points.truncate(REPORT_TOP);
        points
    }

    /// Log the analysis report.
    pub fn log(&self, registry: &TileRegistry) {
        let percent = |count: usize| -> f64 {
            if self.total_tiles == 0 {
                0.0
            } else {
                count as f64 / self.total_tiles as f64 * 100.0
            }
        };

        info!("===== CHAIN ANALYSIS =====");
        if let Some(min) = self.min_length {
            if self.meets_min_length() {
                info!("Chain length {} meets the target of {min}", self.chain_length);
            } else {
                warn!(
                    "Chain length {} is less than minimum requested {min}",
                    self.chain_length
                );
            }
        }
        info!("Total tiles: {}", self.total_tiles);
        info!(
            "Chain length: {} ({:.1}% of total tiles)",
            self.chain_length,
            percent(self.chain_length)
        );
        if self.validation.is_valid() {
            info!("All connections are valid and all IDs are unique");
        } else {
            info!(
                "Invalid chain: {} broken connections, {} defects in total",
                self.validation.broken_links().count(),
                self.validation.defects.len()
            );
        }
        info!("Used in chain: {} ({:.1}%)", self.used, percent(self.used));
        info!(
            "Unused tiles: {} ({:.1}%)",
            self.unused.len(),
            percent(self.unused.len())
        );
        if !self.counts_match() {
            info!(
                "Verification failed: {} + {} != {}",
                self.used,
                self.unused.len(),
                self.total_tiles
            );
        }
        for id in self.unused.iter().take(REPORT_TOP) {
            if let Some(t) = registry.get(*id) {
                info!(
                    "  Unused ID {id}: #{} - Takes: {}, Gives: {}",
                    t.code,
                    t.takes_label(),
                    t.gives_label()
                );
            }
        }
        info!(
            "{} unused tiles could connect to the FRONT of the chain",
            self.extend_front.len()
        );
        info!(
            "{} unused tiles could connect to the END of the chain",
            self.extend_back.len()
        );

        info!("===== BRANCHING ANALYSIS =====");
        if self.branching_points.is_empty() {
            info!("No branching opportunities found in the chain");
        } else {
            info!(
                "Found {} potential branching points in the chain",
                self.branching_points.len()
            );
            for (i, bp) in self.top_branching_points().iter().enumerate() {
                info!(
                    "  {}. Position {}: tile {} -> tile {}, {} other tiles could have followed",
                    i + 1,
                    bp.position + 1,
                    bp.tile_id,
                    bp.used_next,
                    bp.alternatives.len()
                );
            }
        }

        info!("===== CHAIN VISUALIZATION =====");
        for line in self.listing_excerpt() {
            match line {
                Some((i, entry)) => info!("  {}. {entry}", i + 1),
                None => info!("  ..."),
            }
        }
        info!("Chain: {}", self.dotted);
    }
}

/// Analyze the chain against the registry and its connection graph.
pub fn analyze(
    chain: &[usize],
    registry: &TileRegistry,
    connections: &Connections,
    min_length: Option<usize>,
) -> ChainAnalysis {
    let used_ids: HashSet<usize> = chain.iter().copied().collect();
    let unused: Vec<usize> = registry
        .all()
        .iter()
        .map(|t| t.id)
        .filter(|id| !used_ids.contains(id))
        .collect();

    let first: Option<&Tile> = chain.first().and_then(|&id| registry.get(id));
    let last: Option<&Tile> = chain.last().and_then(|&id| registry.get(id));
    let extend_front: Vec<usize> = match first {
        Some(f) => unused
            .iter()
            .copied()
            .filter(|&id| registry.get(id).is_some_and(|t| t.connects_to(f)))
            .collect(),
        None => Vec::new(),
    };
    let extend_back: Vec<usize> = match last {
        Some(l) => unused
            .iter()
            .copied()
            .filter(|&id| registry.get(id).is_some_and(|t| l.connects_to(t)))
            .collect(),
        None => Vec::new(),
    };

    let branching_points: Vec<BranchingPoint> = chain
        .windows(2)
        .enumerate()
        .filter_map(|(position, pair)| {
            let alternatives: Vec<usize> = connections
                .successors(pair[0])
                .iter()
                .copied()
                .filter(|&id| id != pair[1])
                .collect();
            if alternatives.is_empty() {
                None
            } else {
                Some(BranchingPoint {
                    position,
                    tile_id: pair[0],
                    used_next: pair[1],
                    alternatives,
                })
            }
        })
        .collect();

    let dotted: String = validation::resolve(chain, registry)
        .iter()
        .map(|t| t.code.as_str())
        .collect::<Vec<&str>>()
        .join(".");

    let listing: Vec<String> = chain
        .iter()
        .enumerate()
        .filter_map(|(i, &id)| {
            let tile: &Tile = registry.get(id)?;
            let sides: String = format!("({} → {})", tile.takes_label(), tile.gives_label());
            Some(if i == 0 {
                format!("(START) - {id} - {sides}")
            } else {
                format!("{sides} - {id} - {sides}")
            })
        })
        .collect();

    ChainAnalysis {
        total_tiles: registry.len(),
        chain_length: chain.len(),
        validation: validation::validate(chain, registry),
        used: used_ids.len(),
        unused,
        extend_front,
        extend_back,
        branching_points,
        dotted,
        min_length,
        listing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry(codes: &[&str]) -> TileRegistry {
        let mut registry: TileRegistry = TileRegistry::new();
        for code in codes {
            registry.add(code).unwrap();
        }
        registry
    }

    #[test]
    fn unused_tiles_and_extensions() {
        let r: TileRegistry = registry(&[
            "104211", // 0: in chain
            "114212", // 1: in chain
            "094210", // 2: could precede tile 0
            "124277", // 3: could follow tile 1
            "554266", // 4: unrelated
        ]);
        let c: Connections = Connections::build(r.all());
        let analysis: ChainAnalysis = analyze(&[0, 1], &r, &c, None);

        assert!(analysis.validation.is_valid());
        assert_eq!(analysis.used, 2);
        assert_eq!(analysis.unused, vec![2, 3, 4]);
        assert!(analysis.counts_match());
        assert_eq!(analysis.extend_front, vec![2]);
        assert_eq!(analysis.extend_back, vec![3]);
        assert_eq!(analysis.dotted, "104211.114212");
    }

    #[test]
    fn branching_points_list_the_alternatives() {
        let r: TileRegistry = registry(&[
            "104211", "114212", "124213", "114299", "994288", "124277", "774266", "664255",
        ]);
        let c: Connections = Connections::build(r.all());
        let analysis: ChainAnalysis = analyze(&[0, 1, 5, 6, 7], &r, &c, None);

        assert_eq!(
            analysis.branching_points,
            vec![
                BranchingPoint {
                    position: 0,
                    tile_id: 0,
                    used_next: 1,
                    alternatives: vec![3],
                },
                BranchingPoint {
                    position: 1,
                    tile_id: 1,
                    used_next: 5,
                    alternatives: vec![2],
                },
            ]
        );
        assert_eq!(analysis.top_branching_points().len(), 2);
    }

    #[test]
    fn empty_chain_has_everything_unused() {
        let r: TileRegistry = registry(&["104211", "114212"]);
        let c: Connections = Connections::build(r.all());
        let analysis: ChainAnalysis = analyze(&[], &r, &c, None);

        assert_eq!(analysis.unused, vec![0, 1]);
        assert!(analysis.extend_front.is_empty());
        assert!(analysis.extend_back.is_empty());
        assert!(analysis.branching_points.is_empty());
        assert_eq!(analysis.dotted, "");
    }

    #[test]
    fn top_branching_points_sort_by_alternatives() {
        let r: TileRegistry = registry(&[
            "104211", "114212", "114213", "124220", "204299", "204298", "204297",
        ]);
        let c: Connections = Connections::build(r.all());
        // 10 -> 11 -> 12 -> 20 -> 99
        let analysis: ChainAnalysis = analyze(&[0, 1, 3, 4], &r, &c, None);
        let top: Vec<&BranchingPoint> = analysis.top_branching_points();

        assert_eq!(top[0].tile_id, 3);
        assert_eq!(top[0].alternatives, vec![5, 6]);
        assert_eq!(top[1].tile_id, 0);
        assert_eq!(top[1].alternatives, vec![2]);
    }

    #[test]
    fn short_chains_miss_the_minimum_length() {
        let r: TileRegistry = registry(&["104211", "114212", "124213"]);
        let c: Connections = Connections::build(r.all());

        assert!(analyze(&[0, 1, 2], &r, &c, Some(3)).meets_min_length());
        assert!(!analyze(&[0, 1], &r, &c, Some(3)).meets_min_length());
        assert!(analyze(&[0], &r, &c, None).meets_min_length());
    }

    #[test]
    fn listing_shows_sides_and_ids() {
        let r: TileRegistry = registry(&["104211", "114212"]);
        let c: Connections = Connections::build(r.all());
        let analysis: ChainAnalysis = analyze(&[0, 1], &r, &c, None);

        assert_eq!(
            analysis.listing,
            vec!["(START) - 0 - (10 → 11)", "(11 → 12) - 1 - (11 → 12)"]
        );
        assert_eq!(
            analysis.listing_excerpt(),
            vec![
                Some((0, "(START) - 0 - (10 → 11)")),
                Some((1, "(11 → 12) - 1 - (11 → 12)"))
            ]
        );
    }

    #[test]
    fn long_listings_keep_both_ends() {
        let codes: Vec<String> = (10..35).map(|v| format!("{v}42{}", v + 1)).collect();
        let mut r: TileRegistry = TileRegistry::new();
        for code in &codes {
            r.add(code).unwrap();
        }
        let c: Connections = Connections::build(r.all());
        let chain: Vec<usize> = (0..25).collect();
        let analysis: ChainAnalysis = analyze(&chain, &r, &c, None);

        let excerpt: Vec<Option<(usize, &str)>> = analysis.listing_excerpt();
        assert_eq!(excerpt.len(), 11);
        assert_eq!(excerpt[4].map(|(i, _)| i), Some(4));
        assert_eq!(excerpt[5], None);
        assert_eq!(excerpt[6].map(|(i, _)| i), Some(20));
        assert_eq!(excerpt[10].map(|(i, _)| i), Some(24));
    }
}
