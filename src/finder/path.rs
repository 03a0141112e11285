/*
path.rs

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

//! Chain of tiles in the connection graph.

use std::collections::HashSet;

/// Chain object: an ordered list of distinct tile identifiers.
#[derive(Debug, Default, Clone)]
pub struct Chain {
    /// Chain as an ordered list of tile identifiers.
    chain: Vec<usize>,

    /// Stores the membership of the tiles.
    /// Instead of looking for the tile in the [`Chain::chain`] vector, this
    /// [`std::collections::HashSet`] speeds up the lookup.
    members: HashSet<usize>,
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.chain == other.chain
    }
}

impl Chain {
    /// Create an empty [`Chain`] object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`Chain`] object that only contains the given tile.
    pub fn starting_at(id: usize) -> Self {
        let mut chain: Self = Self::new();
        chain.push(id);
        chain
    }

    /// Add a tile at the end of the chain.
    pub fn push(&mut self, id: usize) {
        self.chain.push(id);
        self.members.insert(id);
    }

    /// Return a copy of the chain extended with the given tile.
    pub fn extended(&self, id: usize) -> Self {
        let mut chain: Self = self.clone();
        chain.push(id);
        chain
    }

    /// Get the number of tiles in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain has no tiles.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Whether the tile is in the chain or not.
    pub fn contains(&self, id: usize) -> bool {
        self.members.contains(&id)
    }

    /// Return the chain as a slice of tile identifiers.
    pub fn ids(&self) -> &[usize] {
        &self.chain
    }
}
