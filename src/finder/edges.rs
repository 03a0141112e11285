/*
edges.rs

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

//! Directed connections between tiles.

use log::{Level, debug, info, log_enabled};

use super::tiles::Tile;

/// Number of distinct two-digit side values.
const SIDE_VALUES: usize = 100;

/// Directed graph over tile identifiers.
///
/// The edge `a -> b` exists when `a != b` and tile `a` gives the value that tile `b` takes.
/// The graph is derived from the tile attributes only: build a new one whenever the tile set
/// changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connections {
    /// For each tile, the successors in tile insertion order.
    successors: Vec<Vec<usize>>,

    /// Total number of edges.
    num_connections: usize,
}

impl Connections {
    /// Build the connections for the given tiles.
    ///
    /// Tiles are first grouped by the value they take (at most 100 groups), and each tile is then
    /// joined with the group matching the value it gives.
    /// The result is identical to the all-pairs comparison.
    pub fn build(tiles: &[Tile]) -> Self {
        let mut by_takes: Vec<Vec<usize>> = vec![Vec::new(); SIDE_VALUES];
        for tile in tiles {
            by_takes[tile.takes as usize].push(tile.id);
        }

        let mut num_connections: usize = 0;
        let successors: Vec<Vec<usize>> = tiles
            .iter()
            .map(|tile| {
                let next: Vec<usize> = by_takes[tile.gives as usize]
                    .iter()
                    .filter(|&&id| id != tile.id)
                    .copied()
                    .collect();
                num_connections += next.len();
                next
            })
            .collect();

        info!(
            "Built graph with {} nodes and {num_connections} connections",
            tiles.len()
        );
        let connections: Self = Self {
            successors,
            num_connections,
        };
        if log_enabled!(Level::Debug) {
            connections.debug();
        }
        connections
    }

    /// Build the connections by comparing every ordered pair of tiles.
    #[cfg(test)]
    pub fn build_all_pairs(tiles: &[Tile]) -> Self {
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); tiles.len()];
        let mut num_connections: usize = 0;

        for t1 in tiles {
            for t2 in tiles {
                if t1.id != t2.id && t1.connects_to(t2) {
                    successors[t1.id].push(t2.id);
                    num_connections += 1;
                }
            }
        }
        Self {
            successors,
            num_connections,
        }
    }

    /// Number of nodes (tiles) in the graph.
    pub fn num_tiles(&self) -> usize {
        self.successors.len()
    }

    /// Number of edges in the graph.
    pub fn num_connections(&self) -> usize {
        self.num_connections
    }

    /// For the given tile, return its successors in tile insertion order.
    pub fn successors(&self, id: usize) -> &[usize] {
        match self.successors.get(id) {
            Some(s) => s,
            None => &[],
        }
    }

    /// Print the edges.
    pub fn debug(&self) {
        let mut s: String = String::new();

        for (id, next) in self.successors.iter().enumerate() {
            s.clear();
            s.push_str(&format!("{id:>4} -->"));
            for n in next {
                s.push_str(&format!(" {n}"));
            }
            debug!("{s}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::tiles::TileRegistry;
    use pretty_assertions::assert_eq;

    fn registry(codes: &[&str]) -> TileRegistry {
        let mut registry: TileRegistry = TileRegistry::new();
        for code in codes {
            registry.add(code).unwrap();
        }
        registry
    }

    #[test]
    fn linear_tiles_form_a_single_path() {
        let r: TileRegistry = registry(&["104211", "114212", "124213"]);
        let c: Connections = Connections::build(r.all());

        assert_eq!(c.num_tiles(), 3);
        assert_eq!(c.num_connections(), 2);
        assert_eq!(c.successors(0), &[1]);
        assert_eq!(c.successors(1), &[2]);
        assert!(c.successors(2).is_empty());
    }

    #[test]
    fn self_loops_are_excluded() {
        // Takes 12 and gives 12
        let r: TileRegistry = registry(&["123412", "125612"]);
        let c: Connections = Connections::build(r.all());

        assert_eq!(c.successors(0), &[1]);
        assert_eq!(c.successors(1), &[0]);
        assert_eq!(c.num_connections(), 2);
    }

    #[test]
    fn successors_keep_insertion_order() {
        let r: TileRegistry = registry(&["104211", "119999", "114212", "110000"]);
        let c: Connections = Connections::build(r.all());

        assert_eq!(c.successors(0), &[1, 2, 3]);
    }

    #[test]
    fn unknown_tile_has_no_successors() {
        let c: Connections = Connections::build(&[]);
        assert_eq!(c.num_tiles(), 0);
        assert!(c.successors(7).is_empty());
    }

    #[test]
    fn bucketed_build_matches_all_pairs() {
        let r: TileRegistry = registry(&[
            "104211", "114212", "124213", "114299", "994288", "124277", "774266", "664255",
            "554210", "101010", "104210", "000000", "990000", "009900",
        ]);

        assert_eq!(
            Connections::build(r.all()),
            Connections::build_all_pairs(r.all())
        );
    }
}
