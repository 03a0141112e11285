/*
tiles.rs

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

//! Tiles and the registry that owns them for one search session.
//!
//! A tile is described by a six-digit code `TTMMGG`:
//!
//! - `TT` is the value the tile takes,
//! - `MM` is decorative and ignored,
//! - `GG` is the value the tile gives.
//!
//! A tile can follow another tile when the predecessor gives the value that the successor takes.

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of characters in a tile code.
pub const CODE_LENGTH: usize = 6;

/// Type of errors.
#[derive(Error, Debug, PartialEq)]
pub enum TileError {
    /// The candidate code is not made of exactly six decimal digits.
    #[error("tile code must be a 6-digit string, got: '{code}'")]
    InvalidCode { code: String },
}

/// One tile of the session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tile {
    /// Identifier, assigned densely from 0 in insertion order.
    pub id: usize,

    /// Six-digit source code of the tile.
    pub code: String,

    /// Value taken by the tile (first two digits).
    pub takes: u8,

    /// Value given by the tile (last two digits).
    pub gives: u8,
}

impl Tile {
    /// Whether this tile can be directly followed by the `next` tile.
    pub fn connects_to(&self, next: &Tile) -> bool {
        self.gives == next.takes
    }

    /// Value taken by the tile, formatted on two digits.
    pub fn takes_label(&self) -> String {
        format!("{:02}", self.takes)
    }

    /// Value given by the tile, formatted on two digits.
    pub fn gives_label(&self) -> String {
        format!("{:02}", self.gives)
    }
}

/// Whether the given string is a valid tile code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Convert two ASCII digits into their numeric value.
fn side_value(digits: &[u8]) -> u8 {
    (digits[0] - b'0') * 10 + (digits[1] - b'0')
}

/// Registry of the tiles for one search session.
///
/// The registry is an owned value: create one per session and pass it by reference to the graph
/// builder and to the search engine.
/// There is no deletion, so the identifier of a tile is always its index in [`TileRegistry::all`].
#[derive(Debug, Default, Clone)]
pub struct TileRegistry {
    tiles: Vec<Tile>,
}

impl TileRegistry {
    /// Create an empty [`TileRegistry`] object.
    pub fn new() -> Self {
        Self { tiles: Vec::new() }
    }

    /// Remove all the tiles and restart the identifiers from 0.
    pub fn reset(&mut self) {
        self.tiles.clear();
        info!("Tile collection and ID counter reset");
    }

    /// Validate the code, allocate the next identifier, and store the new tile.
    ///
    /// # Errors
    ///
    /// The method returns [`TileError::InvalidCode`] when the code is not exactly six digits.
    /// The registry is left unchanged in that case.
    pub fn add(&mut self, code: &str) -> Result<&Tile, TileError> {
        if !is_valid_code(code) {
            return Err(TileError::InvalidCode {
                code: code.to_string(),
            });
        }

        let digits: &[u8] = code.as_bytes();
        let id: usize = self.tiles.len();
        self.tiles.push(Tile {
            id,
            code: code.to_string(),
            takes: side_value(&digits[..2]),
            gives: side_value(&digits[CODE_LENGTH - 2..]),
        });
        Ok(&self.tiles[id])
    }

    /// Return all the tiles in insertion order.
    pub fn all(&self) -> &[Tile] {
        &self.tiles
    }

    /// Return the tile with the given identifier.
    pub fn get(&self, id: usize) -> Option<&Tile> {
        self.tiles.get(id)
    }

    /// Number of tiles in the registry.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the registry has no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
