/*
validation.rs

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

//! Verify a chain after the search.
//!
//! The verification never modifies the chain. A chain produced by the search engine that fails
//! the verification reveals a defect in the engine, and is reported as
//! [`ChainError::InternalConsistency`].

use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::tiles::{Tile, TileRegistry};

/// Problem found in a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainDefect {
    /// The tile at `position` does not give what the next tile takes.
    BrokenLink {
        position: usize,
        from: usize,
        to: usize,
        gives: u8,
        takes: u8,
    },

    /// The identifier at `position` is not in the registry.
    UnknownTile { position: usize, id: usize },

    /// The tile at `position` already appears earlier in the chain.
    Duplicate { position: usize, id: usize },
}

impl fmt::Display for ChainDefect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainDefect::BrokenLink {
                position,
                from,
                to,
                gives,
                takes,
            } => write!(
                f,
                "invalid connection at position {position}: tile {from} gives {gives:02} but tile {to} takes {takes:02}"
            ),
            ChainDefect::UnknownTile { position, id } => {
                write!(f, "unknown tile {id} at position {position}")
            }
            ChainDefect::Duplicate { position, id } => {
                write!(f, "tile {id} repeated at position {position}")
            }
        }
    }
}

/// Result of a chain verification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainValidation {
    /// Problems found, in chain order.
    pub defects: Vec<ChainDefect>,
}

impl ChainValidation {
    /// Whether the chain is connected and has no repeated tiles.
    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }

    /// Return the broken links only.
    pub fn broken_links(&self) -> impl Iterator<Item = &ChainDefect> {
        self.defects
            .iter()
            .filter(|d| matches!(d, ChainDefect::BrokenLink { .. }))
    }
}

impl fmt::Display for ChainValidation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let messages: Vec<String> = self.defects.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Type of errors.
#[derive(Error, Debug, PartialEq)]
pub enum ChainError {
    /// The search engine returned a chain that does not pass the verification.
    #[error("internal consistency error in the discovered chain: {0}")]
    InternalConsistency(ChainValidation),
}

/// Verify that consecutive tiles connect and that no tile is repeated.
pub fn validate(chain: &[usize], registry: &TileRegistry) -> ChainValidation {
    let mut defects: Vec<ChainDefect> = Vec::new();
    let mut seen: HashSet<usize> = HashSet::with_capacity(chain.len());

    for (position, &id) in chain.iter().enumerate() {
        if !seen.insert(id) {
            defects.push(ChainDefect::Duplicate { position, id });
        }
        if registry.get(id).is_none() {
            defects.push(ChainDefect::UnknownTile { position, id });
        }
    }

    for (position, pair) in chain.windows(2).enumerate() {
        let (Some(t1), Some(t2)) = (registry.get(pair[0]), registry.get(pair[1])) else {
            continue;
        };
        if !t1.connects_to(t2) {
            defects.push(ChainDefect::BrokenLink {
                position,
                from: t1.id,
                to: t2.id,
                gives: t1.gives,
                takes: t2.takes,
            });
        }
    }
    defects.sort_by_key(|d| match d {
        ChainDefect::BrokenLink { position, .. }
        | ChainDefect::UnknownTile { position, .. }
        | ChainDefect::Duplicate { position, .. } => *position,
    });

    ChainValidation { defects }
}

/// Verify the chain, log the result, and turn a failure into an error.
///
/// # Errors
///
/// The function returns [`ChainError::InternalConsistency`] when the chain is not valid.
pub fn verify(chain: &[usize], registry: &TileRegistry) -> Result<(), ChainError> {
    let validation: ChainValidation = validate(chain, registry);

    if validation.is_valid() {
        if !chain.is_empty() {
            info!("Chain is valid! All connections verified.");
        }
        return Ok(());
    }

    for defect in &validation.defects {
        error!("{defect}");
    }
    Err(ChainError::InternalConsistency(validation))
}

/// Log every tile of the chain with its connection to the next tile.
pub fn debug_chain(chain: &[usize], registry: &TileRegistry) {
    if chain.is_empty() {
        warn!("Empty chain, nothing to debug");
        return;
    }

    debug!("Debug chain ({} tiles):", chain.len());
    for (i, &id) in chain.iter().enumerate() {
        let Some(tile) = registry.get(id) else {
            error!("Tile with ID {id} not found!");
            continue;
        };
        debug!("{}. ID: {}, Number: {}", i + 1, tile.id, tile.code);
        debug!(
            "   Takes: {}, Gives: {}",
            tile.takes_label(),
            tile.gives_label()
        );

        let Some(&next_id) = chain.get(i + 1) else {
            continue;
        };
        match registry.get(next_id) {
            Some(next) if tile.connects_to(next) => debug!(
                "   Connects to next: {} -> {}",
                tile.gives_label(),
                next.takes_label()
            ),
            Some(next) => error!(
                "   INVALID CONNECTION: {} != {}",
                tile.gives_label(),
                next.takes_label()
            ),
            None => error!("   Next tile with ID {next_id} not found!"),
        }
    }
}

/// Return the tiles of the chain, skipping (and logging) identifiers that are not in the registry.
pub fn resolve<'a>(chain: &[usize], registry: &'a TileRegistry) -> Vec<&'a Tile> {
    chain
        .iter()
        .filter_map(|&id| {
            let tile: Option<&Tile> = registry.get(id);
            if tile.is_none() {
                error!("Tile with ID {id} not found in tile collection");
            }
            tile
        })
        .collect()
}
