/*
datasets.rs

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

//! Generate sample tile sources.
//!
//! Generated codes use values between 01 and 99 for the taken and given sides.
//! The generators receive the random number generator so that tests can use a seeded one.

use clap::ValueEnum;
use log::{debug, error, info, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use strum_macros::Display;

use crate::config::{Config, MAX_DATASET_SIZE};
use crate::finder::loader;

/// Number of draws before accepting a value that is already used.
const MAX_DRAWS: usize = 100;

/// Named tile sources in the data directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Display)]
#[value(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Source provided by the user (`source.txt`), never generated.
    Default,
    SmallRandom,
    MediumRandom,
    SmallConnected,
    MediumConnected,
    LargeConnected,
    Complex,
    Cyclic,
}

impl DatasetKind {
    /// Name of the file in the data directory.
    pub fn file_name(&self) -> String {
        match self {
            DatasetKind::Default => String::from("source.txt"),
            _ => format!("{self}.txt"),
        }
    }

    /// Generate the tile codes for the dataset, or [`None`] for the user source.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec<String>> {
        match self {
            DatasetKind::Default => None,
            DatasetKind::SmallRandom => Some(random(rng, 20, true)),
            DatasetKind::MediumRandom => Some(random(rng, 100, true)),
            DatasetKind::SmallConnected => Some(connected(rng, 20, None)),
            DatasetKind::MediumConnected => Some(connected(rng, 100, None)),
            DatasetKind::LargeConnected => Some(connected(rng, 500, Some(5))),
            DatasetKind::Complex => Some(complex(rng, 50, 3, 5)),
            DatasetKind::Cyclic => Some(cyclic(rng, 20, 5)),
        }
    }
}

/// Status of a dataset file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub kind: DatasetKind,
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: u64,

    /// Number of valid tile codes in the file.
    pub tile_count: usize,
}

/// Build a tile code from its three parts.
fn code(takes: u8, middle: u8, gives: u8) -> String {
    format!("{takes:02}{middle:02}{gives:02}")
}

/// Random side value.
fn side<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.random_range(1..=99)
}

/// Random decorative middle value.
fn middle<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.random_range(10..=99)
}

/// Random side value that is not in `used`, if one can be found in a few draws.
/// The returned value is added to `used`.
fn fresh_side<R: Rng + ?Sized>(rng: &mut R, used: &mut HashSet<u8>) -> u8 {
    let mut value: u8 = side(rng);
    let mut draws: usize = 1;
    while used.contains(&value) && draws < MAX_DRAWS {
        value = side(rng);
        draws += 1;
    }
    used.insert(value);
    value
}

/// Limit the requested size.
fn cap_size(size: usize) -> usize {
    if size > MAX_DATASET_SIZE {
        warn!("Dataset size {size} is too large, capping at {MAX_DATASET_SIZE}");
        MAX_DATASET_SIZE
    } else {
        size
    }
}

/// Chain of side values, as distinct as possible.
fn chain_values<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<u8> {
    let mut used: HashSet<u8> = HashSet::with_capacity(count);
    (0..count).map(|_| fresh_side(rng, &mut used)).collect()
}

/// Tiles that link consecutive values.
fn link_values<R: Rng + ?Sized>(rng: &mut R, values: &[u8]) -> Vec<String> {
    values
        .windows(2)
        .map(|w| code(w[0], middle(rng), w[1]))
        .collect()
}

/// Random tiles.
///
/// With `unique`, no code is repeated, and the generation stops after `size * 10` draws.
pub fn random<R: Rng + ?Sized>(rng: &mut R, size: usize, unique: bool) -> Vec<String> {
    let size: usize = cap_size(size);
    let mut codes: Vec<String> = Vec::with_capacity(size);
    let mut seen: HashSet<String> = HashSet::with_capacity(size);
    let max_draws: usize = size * 10;
    let mut draws: usize = 0;

    while codes.len() < size {
        let c: String = code(side(rng), side(rng), side(rng));
        if !unique || seen.insert(c.clone()) {
            codes.push(c);
        }
        draws += 1;
        if draws >= max_draws {
            warn!(
                "Reached maximum attempts ({max_draws}). Generated {} unique tiles.",
                codes.len()
            );
            break;
        }
    }
    codes.shuffle(rng);
    codes
}

/// Tiles that form a chain of `size` tiles.
///
/// With `noise_percent`, additional tiles that never lead back into the chain are mixed with the
/// chain tiles.
pub fn connected<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    noise_percent: Option<usize>,
) -> Vec<String> {
    let size: usize = cap_size(size);
    let values: Vec<u8> = chain_values(rng, size + 1);
    let mut codes: Vec<String> = link_values(rng, &values);

    if let Some(percent) = noise_percent
        && percent > 0
    {
        // Noise tiles must not give a value that a chain tile takes after the first one
        let chain_takes: HashSet<u8> = values.iter().skip(1).copied().collect();
        for _ in 0..size * percent / 100 {
            let takes: u8 = side(rng);
            let mut gives: u8 = side(rng);
            let mut draws: usize = 1;
            while chain_takes.contains(&gives) && draws < MAX_DRAWS {
                gives = side(rng);
                draws += 1;
            }
            codes.push(code(takes, middle(rng), gives));
        }
        codes.shuffle(rng);
    }
    codes
}

/// Tiles that form `chain_count` independent chains sharing `size` tiles.
pub fn complex<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    chain_count: usize,
    min_chain_length: usize,
) -> Vec<String> {
    let size: usize = cap_size(size);
    let chain_count: usize = chain_count.max(1);
    let mut chain_sizes: Vec<usize> = vec![min_chain_length; chain_count];

    // Distribute the remaining tiles randomly among the chains
    for _ in 0..size.saturating_sub(min_chain_length * chain_count) {
        let i: usize = rng.random_range(0..chain_count);
        chain_sizes[i] += 1;
    }

    let mut codes: Vec<String> = Vec::with_capacity(size);
    for (i, chain_size) in chain_sizes.iter().enumerate() {
        let values: Vec<u8> = chain_values(rng, chain_size + 1);
        codes.extend(link_values(rng, &values));
        debug!(
            "Chain {}: length {chain_size}, first value: {:?}, last value: {:?}",
            i + 1,
            values.first(),
            values.last()
        );
    }
    codes.shuffle(rng);
    codes
}

/// Tiles that form a linear chain that ends in a cycle of `cycle_length` tiles (at least 3).
pub fn cyclic<R: Rng + ?Sized>(rng: &mut R, size: usize, cycle_length: usize) -> Vec<String> {
    let size: usize = cap_size(size);
    let cycle_length: usize = cycle_length.max(3);
    let linear_length: usize = size.saturating_sub(cycle_length);

    let mut used: HashSet<u8> = HashSet::new();
    let mut values: Vec<u8> = (0..=linear_length)
        .map(|_| fresh_side(rng, &mut used))
        .collect();
    let cycle_start: u8 = values[linear_length];
    for _ in 1..cycle_length {
        values.push(fresh_side(rng, &mut used));
    }

    let mut codes: Vec<String> = link_values(rng, &values);
    // Close the cycle
    if let Some(&last) = values.last() {
        codes.push(code(last, middle(rng), cycle_start));
    }
    codes.shuffle(rng);
    codes
}

/// Write the tile codes to the given file, one per line.
///
/// # Errors
///
/// The function returns an error when the file cannot be written.
pub fn write(path: &Path, codes: &[String]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, codes.join("\n"))
}

/// Generate and write all the sample datasets.
///
/// Return the dataset kinds with the number of tiles written.
///
/// # Errors
///
/// The function returns an error when a file cannot be written.
pub fn write_all<R: Rng + ?Sized>(
    rng: &mut R,
    config: &Config,
) -> io::Result<Vec<(DatasetKind, usize)>> {
    let mut written: Vec<(DatasetKind, usize)> = Vec::new();

    info!("Creating datasets in {}", config.data_dir.display());
    for kind in DatasetKind::value_variants() {
        let start: Instant = Instant::now();
        let Some(codes) = kind.generate(rng) else {
            continue;
        };
        let path: PathBuf = config.dataset_path(*kind);
        write(&path, &codes)?;
        info!(
            "Created {kind} dataset with {} tiles at {} in {:.2}s",
            codes.len(),
            path.display(),
            start.elapsed().as_secs_f32()
        );
        written.push((*kind, codes.len()));
    }
    Ok(written)
}

/// Return the status of every named dataset.
pub fn describe(config: &Config) -> Vec<DatasetInfo> {
    DatasetKind::value_variants()
        .iter()
        .map(|kind| {
            let path: PathBuf = config.dataset_path(*kind);
            let size_bytes: Option<u64> = fs::metadata(&path).ok().map(|m| m.len());
            let tile_count: usize = match size_bytes {
                Some(_) => loader::count_tiles(&path).unwrap_or_else(|e| {
                    error!("Error reading dataset {kind}: {e}");
                    0
                }),
                None => 0,
            };
            DatasetInfo {
                kind: *kind,
                path,
                exists: size_bytes.is_some(),
                size_bytes: size_bytes.unwrap_or(0),
                tile_count,
            }
        })
        .collect()
}

/// Verify that all the generated datasets exist and contain tiles.
pub fn verify(config: &Config) -> bool {
    let mut all_valid: bool = true;

    for info in describe(config)
        .iter()
        .filter(|i| i.kind != DatasetKind::Default)
    {
        if !info.exists {
            error!("Missing dataset: {}", info.path.display());
            all_valid = false;
        } else if info.tile_count == 0 {
            error!("Empty dataset: {}", info.path.display());
            all_valid = false;
        } else {
            info!(
                "Dataset {}: {} valid tiles, size: {} bytes",
                info.kind, info.tile_count, info.size_bytes
            );
        }
    }
    all_valid
}
