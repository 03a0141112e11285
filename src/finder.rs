/*
finder.rs

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

//! Find the longest chain of tiles.
//!
//! A search session goes through the following steps:
//!
//! * Tiles are stored in a [`tiles::TileRegistry`] object, usually by loading a text source with
//!   [`loader::load_file`].
//!   Each tile receives an identifier, starting from 0 in insertion order.
//!
//! * The [`edges::Connections`] graph is built from the tiles with
//!   [`edges::Connections::build`]. An edge goes from a tile to every other tile that takes the
//!   value it gives.
//!
//! * [`longest_path::find_longest_chain`] explores the graph until all the chains are explored,
//!   a chain with all the tiles is found, or the [`clock::Deadline`] is reached.
//!   Reaching the deadline is not an error: the best chain found so far is returned.
//!
//! * [`validation::verify`] checks the returned [`path::Chain`].
//!   A failure means that the search engine is defective.
//!
//! [`find_longest_chain`] runs the last three steps for a registry. The timeout starts once the
//! graph is built.

pub mod analysis;
pub mod clock;
pub mod edges;
pub mod loader;
pub mod longest_path;
pub mod path;
pub mod tiles;
pub mod validation;

use log::warn;
use std::time::Duration;

use clock::{Clock, Deadline, WallClock};
use edges::Connections;
use longest_path::SearchOutcome;
use tiles::TileRegistry;
use validation::ChainError;

/// Build the connection graph for the registry, search for the longest chain before the timeout,
/// and verify the result.
///
/// An empty registry gives an empty chain.
///
/// # Errors
///
/// The function returns [`ChainError::InternalConsistency`] when the chain returned by the search
/// does not pass the verification.
pub fn find_longest_chain(
    registry: &TileRegistry,
    timeout: Duration,
) -> Result<(SearchOutcome, Connections), ChainError> {
    if registry.is_empty() {
        warn!("No tiles to process");
    }
    let connections: Connections = Connections::build(registry.all());

    // The time budget only covers the search, not the graph construction
    let clock: WallClock = WallClock::start();
    let outcome: SearchOutcome = search(registry, &connections, &clock, timeout)?;
    Ok((outcome, connections))
}

/// Search the longest chain in an already built graph, measuring the timeout with the given
/// clock, and verify the result.
///
/// # Errors
///
/// The function returns [`ChainError::InternalConsistency`] when the chain returned by the search
/// does not pass the verification.
pub fn search(
    registry: &TileRegistry,
    connections: &Connections,
    clock: &dyn Clock,
    timeout: Duration,
) -> Result<SearchOutcome, ChainError> {
    let deadline: Deadline = Deadline::new(clock, timeout);
    let outcome: SearchOutcome =
        longest_path::find_longest_chain(connections, registry.len(), &deadline);

    validation::verify(outcome.chain.ids(), registry)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets;
    use clock::StepClock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn session_on_an_empty_registry() {
        let (outcome, connections) =
            find_longest_chain(&TileRegistry::new(), Duration::from_secs(1)).unwrap();

        assert!(outcome.chain.is_empty());
        assert_eq!(connections.num_tiles(), 0);
    }

    #[test]
    fn timeout_is_measured_from_the_search_start() {
        let mut registry: TileRegistry = TileRegistry::new();
        for code in ["104211", "114212", "124213"] {
            registry.add(code).unwrap();
        }
        let connections: Connections = Connections::build(registry.all());

        // A clock started after the graph build reads 0s at the first start check
        let clock: StepClock = StepClock::new(Duration::from_secs(1));
        let outcome: SearchOutcome =
            search(&registry, &connections, &clock, Duration::from_secs(2)).unwrap();

        assert!(outcome.stats.timed_out);
        assert_eq!(outcome.chain.ids(), &[0, 1]);
    }

    #[test]
    fn chains_from_generated_datasets_are_valid() {
        let mut rng: StdRng = StdRng::seed_from_u64(7);
        let sources: Vec<Vec<String>> = vec![
            datasets::random(&mut rng, 40, true),
            datasets::connected(&mut rng, 30, Some(10)),
            datasets::complex(&mut rng, 30, 3, 5),
            datasets::cyclic(&mut rng, 12, 4),
        ];

        for codes in sources {
            let mut registry: TileRegistry = TileRegistry::new();
            for code in &codes {
                registry.add(code).unwrap();
            }
            let (outcome, _) = find_longest_chain(&registry, Duration::from_secs(5)).unwrap();

            assert!(!outcome.chain.is_empty());
            assert!(outcome.chain.len() <= registry.len());
            assert!(validation::validate(outcome.chain.ids(), &registry).is_valid());
        }
    }

    #[test]
    fn connected_dataset_is_fully_chained() {
        let mut rng: StdRng = StdRng::seed_from_u64(3);
        let codes: Vec<String> = datasets::connected(&mut rng, 15, None);
        let mut registry: TileRegistry = TileRegistry::new();
        for code in &codes {
            registry.add(code).unwrap();
        }
        let (outcome, _) = find_longest_chain(&registry, Duration::from_secs(5)).unwrap();

        // Without noise, the tiles form a single path that starts with the first tile
        assert_eq!(outcome.chain.len(), 15);
        assert!(outcome.stats.perfect);
    }
}
