/*
report.rs

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

//! Save the longest chain in the export directory.
//!
//! The JSON document is a serialization of the [`ChainReport`] object by using [`serde`].
//! Files are named `longest_chain_<timestamp>.json` and `longest_chain_<timestamp>.txt`.

use chrono::{DateTime, Local};
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::finder::longest_path::SearchStats;
use crate::finder::tiles::{Tile, TileRegistry};

/// One tile of the exported chain.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChainEntry {
    /// Position in the chain, starting at 0.
    pub position: usize,
    pub id: usize,

    /// Six-digit code of the tile.
    pub number: String,
    pub takes: String,
    pub gives: String,
}

impl ChainEntry {
    /// Create a [`ChainEntry`] object for the tile at the given position.
    fn new(position: usize, tile: &Tile) -> Self {
        Self {
            position,
            id: tile.id,
            number: tile.code.clone(),
            takes: tile.takes_label(),
            gives: tile.gives_label(),
        }
    }
}

/// Exported chain with the search metrics.
#[derive(Serialize, Debug, Clone)]
pub struct ChainReport {
    /// Creation time, formatted as `YYYYmmdd_HHMMSS`.
    pub timestamp: String,
    pub search_time_seconds: f64,
    pub operations: u64,
    pub max_path_length: usize,
    pub path: Vec<ChainEntry>,

    #[serde(skip)]
    created: DateTime<Local>,
}

impl ChainReport {
    /// Create a [`ChainReport`] object for the chain.
    ///
    /// Identifiers that are not in the registry are logged and skipped.
    pub fn new(
        chain: &[usize],
        stats: &SearchStats,
        registry: &TileRegistry,
        created: DateTime<Local>,
    ) -> Self {
        let path: Vec<ChainEntry> = chain
            .iter()
            .enumerate()
            .filter_map(|(i, &id)| match registry.get(id) {
                Some(tile) => Some(ChainEntry::new(i, tile)),
                None => {
                    error!("Tile with ID {id} not found, skipping it in the export");
                    None
                }
            })
            .collect();

        Self {
            timestamp: created.format("%Y%m%d_%H%M%S").to_string(),
            search_time_seconds: stats.duration.as_secs_f64(),
            operations: stats.operations,
            max_path_length: chain.len(),
            path,
            created,
        }
    }

    /// Return the plain text rendering of the report.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = vec![
            String::from("Tile Chain Export"),
            String::from("================="),
            String::new(),
            format!("Date: {}", self.created.format("%Y-%m-%d %H:%M:%S")),
            format!("Chain Length: {} tiles", self.max_path_length),
            format!("Search Time: {:.2}s", self.search_time_seconds),
            format!("Operations: {}", self.operations),
            String::new(),
            String::from("Chain:"),
            String::new(),
        ];

        let mut previous: Option<&ChainEntry> = None;
        for entry in &self.path {
            lines.push(format!(
                "{}. Tile #{} - Takes: {}, Gives: {}",
                entry.position + 1,
                entry.number,
                entry.takes,
                entry.gives
            ));
            if let Some(p) = previous {
                lines.push(format!("   Connection: {} → {}", p.gives, entry.takes));
            }
            previous = Some(entry);
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Object to export chain reports.
pub struct SaverReport {
    /// Directory that receives the reports.
    export_dir: PathBuf,
}

impl SaverReport {
    /// Create a [`SaverReport`] object.
    ///
    /// The provided [`PathBuf`] is the path to the directory where the reports must be saved.
    /// The directory is created when the first report is saved.
    pub fn new(export_dir: PathBuf) -> Self {
        Self { export_dir }
    }

    /// Return the path of the report file with the given extension.
    fn report_file(&self, report: &ChainReport, extension: &str) -> PathBuf {
        self.export_dir
            .join(format!("longest_chain_{}.{extension}", report.timestamp))
    }

    /// Save the report in JSON format.
    ///
    /// Return the path to the created file.
    pub fn save_json(&self, report: &ChainReport) -> Result<PathBuf, Box<dyn Error>> {
        fs::create_dir_all(&self.export_dir)?;
        let path: PathBuf = self.report_file(report, "json");
        let file: File = File::create(&path)?;
        let mut writer: BufWriter<File> = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;
        info!("Chain exported to {}", path.display());
        Ok(path)
    }

    /// Save the report in plain text format.
    ///
    /// Return the path to the created file.
    pub fn save_text(&self, report: &ChainReport) -> Result<PathBuf, Box<dyn Error>> {
        fs::create_dir_all(&self.export_dir)?;
        let path: PathBuf = self.report_file(report, "txt");

        fs::write(&path, report.to_text())?;
        info!("Chain exported to {}", path.display());
        Ok(path)
    }
}
