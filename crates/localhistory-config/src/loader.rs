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
use crate::schema::Config;
use crate::validation::Validator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding `storage.path`
pub const ENV_STORAGE_PATH: &str = "LOCALHISTORY_STORAGE_PATH";
/// Environment variable overriding `storage.compression`
pub const ENV_COMPRESSION: &str = "LOCALHISTORY_COMPRESSION";
/// Environment variable overriding `diff.max_edit_cost`
pub const ENV_DIFF_MAX_EDIT_COST: &str = "LOCALHISTORY_DIFF_MAX_EDIT_COST";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "LOCALHISTORY_LOG_LEVEL";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;

        info!(
            format = format.name(),
            path = %path.display(),
            "Loaded configuration file"
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        if self.validate {
            config.validate()?;
            debug!("Configuration validated successfully");
        }

        Ok(config)
    }

    /// Load configuration with environment variable overrides
    ///
    /// Overrides are applied before validation so an invalid override is
    /// reported like an invalid file value.
    pub fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let mut config = ConfigLoader::without_validation().load_file(path)?;
        self.apply_env_overrides(&mut config)?;
        if self.validate {
            config.validate()?;
        }
        Ok(config)
    }

    /// Default configuration with environment variable overrides applied
    pub fn defaults_with_overrides(&self) -> ConfigResult<Config> {
        let mut config = Config::default();
        self.apply_env_overrides(&mut config)?;
        if self.validate {
            config.validate()?;
        }
        Ok(config)
    }

    /// Apply `LOCALHISTORY_*` environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        self.apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup` instead of the process environment
    pub fn apply_overrides<F>(&self, config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_STORAGE_PATH) {
            config.storage.path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_COMPRESSION) {
            config.storage.compression = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    ENV_COMPRESSION,
                    &value,
                    "expected 'none', 'zstd' or 'brotli'",
                )
            })?;
        }
        if let Some(value) = lookup(ENV_DIFF_MAX_EDIT_COST) {
            config.diff.max_edit_cost = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    ENV_DIFF_MAX_EDIT_COST,
                    &value,
                    "expected a positive integer",
                )
            })?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.logging.level = value;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use localhistory_compression::CompressionAlgorithm;
    use std::collections::HashMap;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("config.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("config.json").unwrap(), ConfigFormat::Json);
    }

    #[test]
    fn test_format_detection_error() {
        assert!(matches!(
            ConfigFormat::from_path("config.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ConfigFormat::from_path("config"),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new();
        let json = r#"{"storage": {"compression": "brotli"}, "diff": {"max_edit_cost": 64}}"#;
        let config = loader.load_from_string(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.storage.compression, CompressionAlgorithm::Brotli);
        assert_eq!(config.diff.max_edit_cost, 64);
        assert_eq!(config.history.max_age_days, 5);
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new();
        let toml = r#"
        [storage]
        path = "/tmp/history"
        compression = "none"
        compaction_threshold = 0.25

        [logging]
        level = "debug"
        format = "json"
        "#;
        let config = loader.load_from_string(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/history"));
        assert_eq!(config.storage.compression, CompressionAlgorithm::None);
        assert_eq!(config.storage.compaction_threshold, 0.25);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_validation_applies_on_load() {
        let json = r#"{"storage": {"compaction_threshold": 3.0}}"#;
        assert!(ConfigLoader::new()
            .load_from_string(json, ConfigFormat::Json)
            .is_err());
        assert!(ConfigLoader::without_validation()
            .load_from_string(json, ConfigFormat::Json)
            .is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_STORAGE_PATH, "/var/lh"),
            (ENV_COMPRESSION, "brotli"),
            (ENV_DIFF_MAX_EDIT_COST, "10"),
            (ENV_LOG_LEVEL, "trace"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        ConfigLoader::new()
            .apply_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.path, PathBuf::from("/var/lh"));
        assert_eq!(config.storage.compression, CompressionAlgorithm::Brotli);
        assert_eq!(config.diff.max_edit_cost, 10);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = Config::default();
        let err = ConfigLoader::new()
            .apply_overrides(&mut config, |name| {
                (name == ENV_DIFF_MAX_EDIT_COST).then(|| "lots".to_string())
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParsingError { .. }));
    }
}
