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
use crate::schema::*;

/// Validation trait for configuration sections
pub trait Validator {
    /// Reject out-of-range or unknown values
    fn validate(&self) -> ConfigResult<()>;
}

/// Accepted values of `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted values of `logging.format`
pub const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.storage.validate()?;
        self.diff.validate()?;
        self.history.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Validator for StorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("storage.path".to_string()));
        }

        if !is_valid_file_name(&self.file_stem) {
            return Err(ConfigError::invalid_value(
                "storage.file_stem",
                format!("must be a plain file name, got '{}'", self.file_stem),
            ));
        }

        if !(0.0..=1.0).contains(&self.compaction_threshold) {
            return Err(ConfigError::invalid_value(
                "storage.compaction_threshold",
                format!(
                    "must be between 0.0 and 1.0, got {}",
                    self.compaction_threshold
                ),
            ));
        }

        Ok(())
    }
}

impl Validator for DiffConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_edit_cost == 0 {
            return Err(ConfigError::invalid_value(
                "diff.max_edit_cost",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Validator for HistoryConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !is_valid_file_name(&self.change_log_file) {
            return Err(ConfigError::invalid_value(
                "history.change_log_file",
                format!("must be a plain file name, got '{}'", self.change_log_file),
            ));
        }
        Ok(())
    }
}

impl Validator for LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("must be one of: {}", LOG_LEVELS.join(", ")),
            ));
        }

        if !LOG_FORMATS.contains(&self.format.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.format",
                format!("must be one of: {}", LOG_FORMATS.join(", ")),
            ));
        }

        Ok(())
    }
}

fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compaction_threshold_range() {
        let mut config = Config::default();
        config.storage.compaction_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("storage.compaction_threshold"));

        config.storage.compaction_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_names_must_be_plain() {
        let mut config = Config::default();
        config.storage.file_stem = "../escape".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.history.change_log_file = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_edit_cost_rejected() {
        let mut config = Config::default();
        config.diff.max_edit_cost = 0;
        assert_eq!(
            config.validate().unwrap_err().field(),
            Some("diff.max_edit_cost")
        );
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_format_validation() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
