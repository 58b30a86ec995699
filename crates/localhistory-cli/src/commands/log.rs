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
use console::style;
use localhistory_config::Config;
use serde::Serialize;

/// List recorded change sets, newest first
#[derive(Parser, Debug)]
pub struct LogCmd {
    /// Show at most this many change sets
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub max_count: Option<usize>,

    /// One line per change set
    #[arg(long)]
    pub oneline: bool,

    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ChangeSetJson {
    id: u64,
    name: Option<String>,
    timestamp: i64,
    changes: Vec<String>,
}

impl LogCmd {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let history = open_history(config)?;
        let limit = self.max_count.unwrap_or(usize::MAX);
        let sets = history.changes().sets().iter().rev().take(limit);

        if self.json {
            let sets: Vec<ChangeSetJson> = sets
                .map(|set| ChangeSetJson {
                    id: set.id,
                    name: set.name.clone(),
                    timestamp: set.timestamp,
                    changes: set.changes().iter().map(ToString::to_string).collect(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&sets)?);
            return Ok(());
        }

        if history.changes().is_empty() {
            output::info("No change sets recorded");
            return Ok(());
        }

        for set in sets {
            let label = set.name.as_deref().unwrap_or("(unnamed)");
            if self.oneline {
                println!(
                    "{} {} {}",
                    style(format!("#{}", set.id)).yellow(),
                    label,
                    style(format!("[{} changes]", set.len())).dim()
                );
                continue;
            }
            println!("{} {}", style(format!("change set #{}", set.id)).yellow().bold(), label);
            println!("Date: {}", output::timestamp(set.timestamp));
            for change in set.changes() {
                println!("    {change}");
            }
            println!();
        }
        Ok(())
    }
}
