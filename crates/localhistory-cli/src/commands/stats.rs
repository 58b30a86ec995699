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
use crate::context::open_history;
use crate::output;
use anyhow::Result;
use clap::Parser;
use localhistory_config::Config;
use serde_json::json;

/// Show storage and history statistics
#[derive(Parser, Debug)]
pub struct StatsCmd {
    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCmd {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let history = open_history(config)?;
        let stats = history.stats();
        let changes = history.changes();

        if self.json {
            let value = json!({
                "storage": {
                    "path": config.storage.path.display().to_string(),
                    "compression": config.storage.compression.to_string(),
                    "live_records": stats.live_records,
                    "free_slots": stats.free_slots,
                    "live_bytes": stats.live_bytes,
                    "data_bytes": stats.data_bytes,
                    "wasted_bytes": stats.wasted_bytes(),
                    "wasted_ratio": stats.wasted_ratio(),
                },
                "history": {
                    "entries": history.root().len(),
                    "change_sets": changes.len(),
                    "last_change_set": changes.last_id(),
                }
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        output::header("Storage:");
        output::detail("Path", &config.storage.path.display().to_string());
        output::detail("Compression", &config.storage.compression.to_string());
        output::detail("Live records", &stats.live_records.to_string());
        output::detail("Free slots", &stats.free_slots.to_string());
        output::detail("Live data", &output::bytes(stats.live_bytes));
        output::detail("Data file", &output::bytes(stats.data_bytes));
        output::detail(
            "Wasted",
            &format!(
                "{} ({:.1}%)",
                output::bytes(stats.wasted_bytes()),
                stats.wasted_ratio() * 100.0
            ),
        );
        println!();
        output::header("History:");
        output::detail("Entries", &history.root().len().to_string());
        output::detail("Change sets", &changes.len().to_string());
        output::detail("Last change set", &changes.last_id().to_string());
        Ok(())
    }
}
