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
#![allow(clippy::unwrap_used)]
//! Integration tests for logging setup
//!
//! Subscribers are installed with `with_default` so tests do not fight over
//! the process-wide global.

use localhistory_config::LoggingConfig;
use localhistory_observability::{build_subscriber, LogConfig, LogFormat, LogOutput};

#[test]
fn test_config_builder_chaining() {
    let config = LogConfig::new()
        .with_format(LogFormat::Json)
        .with_level("debug")
        .with_timestamps(false)
        .with_color(false)
        .with_targets(false)
        .with_output(LogOutput::Stdout);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level.as_deref(), Some("debug"));
    assert!(!config.use_timestamps);
    assert!(!config.use_color);
    assert!(!config.include_targets);
    assert_eq!(config.output, LogOutput::Stdout);
}

#[test]
fn test_every_format_builds_and_logs() {
    for format in [LogFormat::Pretty, LogFormat::Compact, LogFormat::Json] {
        for timestamps in [true, false] {
            let config = LogConfig::new()
                .with_format(format)
                .with_level("trace")
                .with_timestamps(timestamps)
                .with_color(false);
            let subscriber = build_subscriber(&config).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                tracing::info!(format = %format, timestamps, "subscriber smoke test");
            });
        }
    }
}

#[test]
fn test_settings_with_bad_format_rejected() {
    let settings = LoggingConfig {
        level: "info".to_string(),
        format: "yaml".to_string(),
    };
    assert!(LogConfig::from_settings(&settings).is_err());
}
