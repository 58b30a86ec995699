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
//! Locating the configuration and the history a command works on

use anyhow::{bail, Context, Result};
use localhistory_config::{Config, ConfigLoader, Validator};
use localhistory_versioning::LocalHistory;
use std::path::Path;
use tracing::debug;

/// Resolve `--config`
///
/// A file is read as TOML or JSON; a relative storage path in it is taken
/// relative to the file. Anything else names the history directory itself,
/// with `localhistory.toml` inside it read when present. Environment
/// overrides apply in both cases.
pub fn load_config(path: &Path) -> Result<Config> {
    let loader = ConfigLoader::new();
    let config = if path.is_file() {
        let mut config = loader
            .load_with_overrides(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        if config.storage.path.is_relative() {
            if let Some(parent) = path.parent() {
                config.storage.path = parent.join(&config.storage.path);
            }
        }
        config
    } else {
        let mut config = Config::load(path)
            .with_context(|| format!("Failed to load configuration in {}", path.display()))?;
        config.storage.path = path.to_path_buf();
        loader.apply_env_overrides(&mut config)?;
        config.validate()?;
        config
    };
    debug!(
        storage = %config.storage.path.display(),
        compression = %config.storage.compression,
        "Resolved configuration"
    );
    Ok(config)
}

/// Open an existing history, refusing to create one
pub fn open_history(config: &Config) -> Result<LocalHistory> {
    let dir = &config.storage.path;
    if !dir.is_dir() {
        bail!("No local history found at {}", dir.display());
    }
    LocalHistory::open(config)
        .with_context(|| format!("Failed to open local history at {}", dir.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_config_uses_directory_as_storage() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.storage.path, dir.path());
    }

    #[test]
    fn test_file_config_resolves_relative_storage() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("history.toml");
        std::fs::write(&file, "[storage]\npath = \"store\"\n").unwrap();
        let config = load_config(&file).unwrap();
        assert_eq!(config.storage.path, dir.path().join("store"));
    }

    #[test]
    fn test_missing_history_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("absent");
        let err = open_history(&config).unwrap_err();
        assert!(err.to_string().contains("No local history"));
    }
}
