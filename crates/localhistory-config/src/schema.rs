// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use crate::error::{ConfigError, ConfigResult};
use localhistory_compression::{CompressionAlgorithm, CompressionLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up inside a history directory
pub const CONFIG_FILE_NAME: &str = "localhistory.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Content store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Line diff settings
    #[serde(default)]
    pub diff: DiffConfig,

    /// Change log settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load `localhistory.toml` from a history directory
    ///
    /// A missing file yields the default configuration with `storage.path`
    /// pointing at `dir`.
    pub fn load(dir: impl AsRef<Path>) -> ConfigResult<Self> {
        use crate::ConfigLoader;
        let dir = dir.as_ref();
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            let mut config = Self::default();
            config.storage.path = dir.to_path_buf();
            return Ok(config);
        }

        let loader = ConfigLoader::new();
        loader.load_file(&config_path)
    }

    /// Write this configuration as `localhistory.toml` into `dir`
    pub fn save(&self, dir: impl AsRef<Path>) -> ConfigResult<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        std::fs::write(dir.join(CONFIG_FILE_NAME), toml_str)?;
        Ok(())
    }

    /// Path of the serialized change log
    pub fn change_log_path(&self) -> PathBuf {
        self.storage.path.join(&self.history.change_log_file)
    }
}

/// Content store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding the index, data and change log files
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Payload codec
    #[serde(default)]
    pub compression: CompressionAlgorithm,

    /// Codec effort
    #[serde(default)]
    pub compression_level: CompressionLevel,

    /// Dead share of the data file that triggers compaction on save
    #[serde(default = "default_compaction_threshold")]
    pub compaction_threshold: f64,

    /// Base name of the `.idx` / `.dat` files
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            compression: CompressionAlgorithm::default(),
            compression_level: CompressionLevel::default(),
            compaction_threshold: default_compaction_threshold(),
            file_stem: default_file_stem(),
        }
    }
}

/// Line diff configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffConfig {
    /// Edit distance above which a diff gives up as too large
    #[serde(default = "default_max_edit_cost")]
    pub max_edit_cost: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_edit_cost: default_max_edit_cost(),
        }
    }
}

/// Change log configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Change sets older than this many days are purged
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// File name of the persisted change log inside `storage.path`
    #[serde(default = "default_change_log_file")]
    pub change_log_file: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            change_log_file: default_change_log_file(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".localhistory")
}

fn default_compaction_threshold() -> f64 {
    0.5
}

fn default_file_stem() -> String {
    "content".to_string()
}

fn default_max_edit_cost() -> usize {
    2048
}

fn default_max_age_days() -> u32 {
    5
}

fn default_change_log_file() -> String {
    "changes.bin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
