/*
loader.rs

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

//! Load tiles from a text source.
//!
//! The source has one tile code per line. After trimming the surrounding whitespace, a line is
//! accepted when it is exactly six decimal digits. Other lines, including blank lines, are
//! skipped and counted.

use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::tiles::{TileError, TileRegistry, is_valid_code};

/// Byte order mark that some editors add at the beginning of UTF-8 files.
const BOM: char = '\u{feff}';

/// Counters for a load operation.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LoadSummary {
    /// Number of tiles added to the registry.
    pub loaded: usize,

    /// Number of lines that were not valid tile codes.
    pub skipped: usize,
}

/// Return the line content without the surrounding whitespace and without a leading byte order
/// mark.
fn clean_line(line: &str) -> &str {
    line.trim().trim_start_matches(BOM).trim()
}

/// Add the tiles read from the given reader to the registry.
///
/// # Errors
///
/// The function returns an error when the reader fails, for example when the data is not valid
/// UTF-8. Tiles read before the error stay in the registry.
pub fn load<R: BufRead>(registry: &mut TileRegistry, reader: R) -> io::Result<LoadSummary> {
    let mut summary: LoadSummary = LoadSummary::default();

    for line in reader.lines() {
        let line: String = line?;
        let code: &str = clean_line(&line);

        match registry.add(code) {
            Ok(_) => summary.loaded += 1,
            Err(TileError::InvalidCode { code }) => {
                if !code.is_empty() {
                    warn!("Skipping invalid tile '{code}'");
                }
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Reset the registry and load the tiles from the given file.
///
/// # Errors
///
/// The function returns an error when the file cannot be opened or read.
pub fn load_file(registry: &mut TileRegistry, path: &Path) -> io::Result<LoadSummary> {
    info!("Loading tiles from {}", path.display());
    let file: File = File::open(path)?;

    registry.reset();
    let summary: LoadSummary = load(registry, BufReader::new(file))?;
    info!(
        "Loaded {} tiles, skipped {} invalid entries",
        summary.loaded, summary.skipped
    );
    Ok(summary)
}

/// Count the valid tile codes in the given file without loading them.
///
/// # Errors
///
/// The function returns an error when the file cannot be opened or read.
pub fn count_tiles(path: &Path) -> io::Result<usize> {
    let reader: BufReader<File> = BufReader::new(File::open(path)?);
    let mut count: usize = 0;

    for line in reader.lines() {
        if is_valid_code(clean_line(&line?)) {
            count += 1;
        }
    }
    Ok(count)
}
