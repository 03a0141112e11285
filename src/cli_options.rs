/*
cli_options.rs

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

//! Process command-line options.
//!
//! # Examples
//!
//! Generate the sample datasets in the data directory:
//!
//! ```
//! $ tilechain generate --seed 42
//! ```
//!
//! List the datasets:
//!
//! ```
//! $ tilechain datasets
//! default           data/source.txt            missing
//! small_random      data/small_random.txt      20 tiles (139 bytes)
//! ...
//! ```
//!
//! List the tiles of a file with the number of skipped lines:
//!
//! ```
//! $ tilechain tiles --file tiles.txt
//! ```
//!
//! Search the longest chain in a dataset for at most 10 seconds, and export the result in JSON
//! format only:
//!
//! ```
//! $ tilechain search --dataset large_connected --timeout 10 --format json
//! ```

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Target};
use log::{Level, LevelFilter, debug, info, log_enabled};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{self, COPYRIGHT_NOTICE, Config, DEFAULT_TIMEOUT_SEC, TIMEOUT_ENV};
use crate::datasets::{self, DatasetInfo, DatasetKind};
use crate::finder;
use crate::finder::analysis;
use crate::finder::edges::Connections;
use crate::finder::loader::{self, LoadSummary};
use crate::finder::longest_path::{SearchOutcome, SearchStats};
use crate::finder::tiles::{Tile, TileRegistry};
use crate::finder::validation;
use crate::saver::report::{ChainReport, SaverReport};

/// Find the longest chain of tiles.
#[derive(Parser)]
#[command(about, long_about = None, version, long_version = COPYRIGHT_NOTICE)]
struct Args {
    /// Enable debug messages
    #[arg(short, long, default_value_t = false, global = true)]
    debug: bool,

    /// Write the log messages to this file instead of the standard error
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the longest chain of tiles
    Search(SearchArgs),

    /// List the tiles loaded from a source
    Tiles(SourceArgs),

    /// List the datasets in the data directory
    Datasets,

    /// Generate the sample datasets in the data directory
    Generate {
        /// Seed for the random number generator
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

/// Formats of the exported chain.
#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum ExportFormat {
    Json,
    Text,
    Both,
}

/// Source of the tiles.
#[derive(clap::Args)]
struct SourceArgs {
    /// File that contains the tile codes, one per line
    #[arg(short, long, conflicts_with = "dataset")]
    file: Option<PathBuf>,

    /// Named dataset in the data directory
    #[arg(value_enum, short = 's', long)]
    dataset: Option<DatasetKind>,
}

impl SourceArgs {
    /// Return the path of the tile source. The default dataset is used when no source is given.
    fn path(&self, config: &Config) -> PathBuf {
        match (&self.file, self.dataset) {
            (Some(file), _) => file.clone(),
            (None, Some(kind)) => config.dataset_path(kind),
            (None, None) => config.dataset_path(DatasetKind::Default),
        }
    }

    /// Load the tiles into a new registry.
    fn load(&self, config: &Config) -> Result<(TileRegistry, LoadSummary), String> {
        let path: PathBuf = self.path(config);
        let mut registry: TileRegistry = TileRegistry::new();

        match loader::load_file(&mut registry, &path) {
            Ok(summary) => Ok((registry, summary)),
            Err(e) => Err(format!("Cannot load the tiles from {}: {e}", path.display())),
        }
    }
}

#[derive(clap::Args)]
struct SearchArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Maximum search duration in seconds
    #[arg(short, long, env = TIMEOUT_ENV, default_value_t = DEFAULT_TIMEOUT_SEC as f64)]
    timeout: f64,

    /// Do not export the chain
    #[arg(long, default_value_t = false)]
    no_export: bool,

    /// Format of the exported chain
    #[arg(value_enum, long, default_value_t = ExportFormat::Both)]
    format: ExportFormat,

    /// Analyze the chain after the search
    #[arg(short, long, default_value_t = false)]
    analyze: bool,

    /// Warn during the analysis when the chain is shorter than this length
    #[arg(short, long, requires = "analyze")]
    min_length: Option<usize>,
}

/// Initialize the logger.
fn init_logger(debug: bool, log_file: Option<&PathBuf>) -> Result<(), String> {
    let mut builder: Builder = Builder::from_default_env();

    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    if let Some(path) = log_file {
        let file: File = File::create(path)
            .map_err(|e| format!("Cannot create the log file {}: {e}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Parse and process command-line options.
///
/// Return the exit status of the program.
pub fn parse() -> u8 {
    let args: Args = Args::parse();

    if let Err(msg) = init_logger(args.debug, args.log_file.as_ref()) {
        eprintln!("{msg}");
        return 1;
    }
    let config: Config = Config::from_env();

    match &args.command {
        Command::Search(search_args) => search(search_args, &config),
        Command::Tiles(source) => list_tiles(source, &config),
        Command::Datasets => list_datasets(&config),
        Command::Generate { seed } => generate(*seed, &config),
    }
}

/// Load the tiles, search the longest chain, and report it.
fn search(args: &SearchArgs, config: &Config) -> u8 {
    let registry: TileRegistry = match args.source.load(config) {
        Ok((registry, _)) => registry,
        Err(msg) => {
            eprintln!("{msg}");
            return 1;
        }
    };

    let timeout: Duration = config::clamp_timeout(args.timeout);
    debug!("Search timeout: {timeout:?}");
    let (outcome, connections): (SearchOutcome, Connections) =
        match finder::find_longest_chain(&registry, timeout) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        };

    if outcome.chain.is_empty() {
        println!("No chain found");
        return 0;
    }
    print_chain(&outcome, &registry);

    if log_enabled!(Level::Debug) {
        validation::debug_chain(outcome.chain.ids(), &registry);
    }
    if args.analyze {
        analysis::analyze(
            outcome.chain.ids(),
            &registry,
            &connections,
            args.min_length,
        )
        .log(&registry);
    }
    if args.no_export {
        return 0;
    }

    let report: ChainReport =
        ChainReport::new(outcome.chain.ids(), &outcome.stats, &registry, Local::now());
    let saver: SaverReport = SaverReport::new(config.export_dir.clone());
    if matches!(args.format, ExportFormat::Json | ExportFormat::Both)
        && let Err(e) = saver.save_json(&report)
    {
        eprintln!("Cannot export the chain in JSON format: {e}");
        return 1;
    }
    if matches!(args.format, ExportFormat::Text | ExportFormat::Both)
        && let Err(e) = saver.save_text(&report)
    {
        eprintln!("Cannot export the chain in text format: {e}");
        return 1;
    }
    0
}

/// Print the chain, one tile per line, with the connection to the previous tile.
fn print_chain(outcome: &SearchOutcome, registry: &TileRegistry) {
    let stats: &SearchStats = &outcome.stats;

    println!(
        "Longest chain: {} of {} tiles ({} operations in {:.2}s{})",
        outcome.chain.len(),
        registry.len(),
        stats.operations,
        stats.duration.as_secs_f32(),
        if stats.timed_out { ", timed out" } else { "" }
    );
    let mut previous: Option<&Tile> = None;
    for (i, tile) in validation::resolve(outcome.chain.ids(), registry)
        .into_iter()
        .enumerate()
    {
        match previous {
            Some(p) => println!(
                "{:>5}. #{}  {} -> {}",
                i + 1,
                tile.code,
                p.gives_label(),
                tile.takes_label()
            ),
            None => println!("{:>5}. #{}", i + 1, tile.code),
        }
        previous = Some(tile);
    }
}

/// Print the loaded tiles, one per line, and the load counters.
fn list_tiles(source: &SourceArgs, config: &Config) -> u8 {
    let (registry, summary): (TileRegistry, LoadSummary) = match source.load(config) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("{msg}");
            return 1;
        }
    };

    println!("{:>6}  {:<6}  {:>5}  {:>5}", "ID", "CODE", "TAKES", "GIVES");
    for tile in registry.all() {
        println!(
            "{:>6}  {:<6}  {:>5}  {:>5}",
            tile.id,
            tile.code,
            tile.takes_label(),
            tile.gives_label()
        );
    }
    println!(
        "{} tiles loaded, {} invalid lines skipped",
        summary.loaded, summary.skipped
    );
    0
}

/// Print the status of the named datasets.
fn list_datasets(config: &Config) -> u8 {
    let infos: Vec<DatasetInfo> = datasets::describe(config);
    let width: usize = infos
        .iter()
        .map(|i| i.path.display().to_string().len())
        .max()
        .unwrap_or(0);

    for info in &infos {
        let status: String = if info.exists {
            format!("{} tiles ({} bytes)", info.tile_count, info.size_bytes)
        } else {
            String::from("missing")
        };
        println!(
            "{:<17} {:<width$}  {status}",
            info.kind.to_string(),
            info.path.display().to_string()
        );
    }
    0
}

/// Generate the sample datasets and verify them.
fn generate(seed: Option<u64>, config: &Config) -> u8 {
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    match datasets::write_all(&mut rng, config) {
        Ok(written) => {
            for (kind, count) in written {
                println!("{kind}: {count} tiles");
            }
        }
        Err(e) => {
            eprintln!("Cannot write the datasets: {e}");
            return 1;
        }
    }
    if datasets::verify(config) {
        info!("All datasets are valid");
        0
    } else {
        eprintln!("Some datasets are missing or empty");
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_line_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn search_defaults() {
        let args: Args = Args::try_parse_from(["tilechain", "search"]).unwrap();
        let Command::Search(search) = args.command else {
            panic!("search command expected");
        };

        assert!(search.source.file.is_none());
        assert!(search.source.dataset.is_none());
        assert!(search.min_length.is_none());
        assert_eq!(search.format, ExportFormat::Both);
        assert!(!search.no_export);
        assert!(!search.analyze);
    }

    #[test]
    fn tiles_reads_a_file_or_a_dataset() {
        let args: Args =
            Args::try_parse_from(["tilechain", "tiles", "--file", "tiles.txt"]).unwrap();
        let Command::Tiles(source) = args.command else {
            panic!("tiles command expected");
        };
        assert_eq!(source.file, Some(PathBuf::from("tiles.txt")));

        let args: Args = Args::try_parse_from(["tilechain", "tiles", "-s", "cyclic"]).unwrap();
        let Command::Tiles(source) = args.command else {
            panic!("tiles command expected");
        };
        assert_eq!(source.dataset, Some(DatasetKind::Cyclic));
    }

    #[test]
    fn tiles_source_is_loaded_with_its_counters() {
        let dir: TempDir = TempDir::new().unwrap();
        let file: PathBuf = dir.path().join("tiles.txt");
        fs::write(&file, "104211\nbad\n114212\n").unwrap();
        let config: Config = Config {
            data_dir: dir.path().to_path_buf(),
            export_dir: dir.path().join("exports"),
        };
        let source: SourceArgs = SourceArgs {
            file: Some(file),
            dataset: None,
        };

        let (registry, summary) = source.load(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            summary,
            LoadSummary {
                loaded: 2,
                skipped: 1
            }
        );
        assert_eq!(list_tiles(&source, &config), 0);

        let missing: SourceArgs = SourceArgs {
            file: None,
            dataset: Some(DatasetKind::Complex),
        };
        assert!(missing.load(&config).is_err());
        assert_eq!(list_tiles(&missing, &config), 1);
    }

    #[test]
    fn min_length_requires_analyze() {
        assert!(Args::try_parse_from(["tilechain", "search", "--min-length", "64"]).is_err());
        let args: Args =
            Args::try_parse_from(["tilechain", "search", "--analyze", "--min-length", "64"])
                .unwrap();
        let Command::Search(search) = args.command else {
            panic!("search command expected");
        };
        assert_eq!(search.min_length, Some(64));
    }

    #[test]
    fn datasets_use_snake_case_names() {
        let args: Args = Args::try_parse_from([
            "tilechain",
            "--debug",
            "search",
            "--dataset",
            "large_connected",
            "--timeout",
            "2.5",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(args.debug);
        let Command::Search(search) = args.command else {
            panic!("search command expected");
        };

        assert_eq!(search.source.dataset, Some(DatasetKind::LargeConnected));
        assert_eq!(search.timeout, 2.5);
        assert_eq!(search.format, ExportFormat::Json);
    }

    #[test]
    fn file_and_dataset_conflict() {
        assert!(
            Args::try_parse_from([
                "tilechain",
                "search",
                "--file",
                "tiles.txt",
                "--dataset",
                "cyclic"
            ])
            .is_err()
        );
    }
}
