/*
config.rs

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

//! Application settings.
//!
//! The data directory stores the tile sources, and the export directory receives the chain
//! reports. Both can be changed with the `TILECHAIN_DATA_DIR` and `TILECHAIN_EXPORT_DIR`
//! environment variables.

use log::{debug, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::datasets::DatasetKind;

pub const COPYRIGHT_NOTICE: &str = "Copyright 2025 Hervé Quatremain
License GPLv3+: GNU GPL version 3 or later <https://gnu.org/licenses/gpl.html>.
This is free software: you are free to change and redistribute it.
There is NO WARRANTY, to the extent permitted by law.";

/// Environment variable for the data directory.
pub const DATA_DIR_ENV: &str = "TILECHAIN_DATA_DIR";

/// Environment variable for the export directory.
pub const EXPORT_DIR_ENV: &str = "TILECHAIN_EXPORT_DIR";

/// Environment variable for the search timeout, in seconds.
pub const TIMEOUT_ENV: &str = "TILECHAIN_TIMEOUT";

/// Search timeout when none is provided.
pub const DEFAULT_TIMEOUT_SEC: u64 = 60;

/// Smallest accepted search timeout.
pub const MIN_TIMEOUT_SEC: u64 = 1;

/// Largest accepted search timeout (10 minutes).
pub const MAX_TIMEOUT_SEC: u64 = 600;

/// Interval between two progress reports during the search.
pub const PROGRESS_INTERVAL_SEC: u64 = 5;

/// Largest number of tiles in a generated dataset.
pub const MAX_DATASET_SIZE: usize = 10_000;

/// Directories used by the application.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory that stores the tile sources.
    pub data_dir: PathBuf,

    /// Directory that receives the exported reports.
    pub export_dir: PathBuf,
}

impl Config {
    /// Create a [`Config`] object from the environment.
    pub fn from_env() -> Self {
        let config: Self = Self {
            data_dir: env::var_os(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            export_dir: env::var_os(EXPORT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("exports")),
        };
        debug!("Data directory: {:?}", config.data_dir);
        debug!("Export directory: {:?}", config.export_dir);
        config
    }

    /// Return the path of the given dataset.
    pub fn dataset_path(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }
}

/// Convert a timeout in seconds into a [`Duration`] within the accepted range.
///
/// Values that are not finite, such as NaN, fall back to [`DEFAULT_TIMEOUT_SEC`].
pub fn clamp_timeout(seconds: f64) -> Duration {
    if !seconds.is_finite() {
        warn!("Invalid timeout value, using default: {DEFAULT_TIMEOUT_SEC}");
        return Duration::from_secs(DEFAULT_TIMEOUT_SEC);
    }
    let clamped: f64 = seconds.clamp(MIN_TIMEOUT_SEC as f64, MAX_TIMEOUT_SEC as f64);
    if clamped != seconds {
        warn!("Timeout {seconds}s out of range, using {clamped}s");
    }
    Duration::from_secs_f64(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_clamped() {
        assert_eq!(clamp_timeout(30.0), Duration::from_secs(30));
        assert_eq!(clamp_timeout(0.0), Duration::from_secs(MIN_TIMEOUT_SEC));
        assert_eq!(clamp_timeout(-5.0), Duration::from_secs(MIN_TIMEOUT_SEC));
        assert_eq!(clamp_timeout(3600.0), Duration::from_secs(MAX_TIMEOUT_SEC));
        assert_eq!(clamp_timeout(1.5), Duration::from_millis(1500));
        assert_eq!(clamp_timeout(f64::NAN), Duration::from_secs(DEFAULT_TIMEOUT_SEC));
    }

    #[test]
    fn dataset_paths_are_in_the_data_directory() {
        let config: Config = Config {
            data_dir: PathBuf::from("/srv/tiles"),
            export_dir: PathBuf::from("/srv/exports"),
        };
        assert_eq!(
            config.dataset_path(DatasetKind::Default),
            PathBuf::from("/srv/tiles/source.txt")
        );
        assert_eq!(
            config.dataset_path(DatasetKind::LargeConnected),
            PathBuf::from("/srv/tiles/large_connected.txt")
        );
    }
}
