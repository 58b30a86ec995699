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
use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use localhistory_config::Config;
use localhistory_versioning::{diff, Hunk};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Show the line hunks between two text files
#[derive(Parser, Debug)]
pub struct DiffCmd {
    /// Older file
    pub old: PathBuf,

    /// Newer file
    pub new: PathBuf,

    /// Upper bound on the edit distance (defaults to the configured value)
    #[arg(long, value_name = "COST")]
    pub max_edit_cost: Option<usize>,

    /// Print hunk spans only
    #[arg(long)]
    pub stat: bool,

    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct HunkJson {
    line0: usize,
    deleted: usize,
    line1: usize,
    inserted: usize,
}

impl DiffCmd {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let old = read_text(&self.old)?;
        let new = read_text(&self.new)?;
        let old_lines: Vec<&str> = old.lines().collect();
        let new_lines: Vec<&str> = new.lines().collect();

        let max_edit_cost = self.max_edit_cost.unwrap_or(config.diff.max_edit_cost);
        let hunks = diff(&old_lines, &new_lines, max_edit_cost).with_context(|| {
            format!(
                "Cannot diff {} and {}",
                self.old.display(),
                self.new.display()
            )
        })?;
        let hunks: Vec<&Hunk> = hunks.as_deref().into_iter().flat_map(Hunk::iter).collect();

        if self.json {
            let spans: Vec<HunkJson> = hunks
                .iter()
                .map(|h| HunkJson {
                    line0: h.line0,
                    deleted: h.deleted,
                    line1: h.line1,
                    inserted: h.inserted,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&spans)?);
            return Ok(());
        }

        println!("{}", style(format!("--- {}", self.old.display())).bold());
        println!("{}", style(format!("+++ {}", self.new.display())).bold());
        for hunk in hunks {
            println!(
                "{}",
                style(format!(
                    "@@ -{},{} +{},{} @@",
                    hunk.line0 + 1,
                    hunk.deleted,
                    hunk.line1 + 1,
                    hunk.inserted
                ))
                .cyan()
            );
            if self.stat {
                continue;
            }
            for line in &old_lines[hunk.line0..hunk.line0 + hunk.deleted] {
                println!("{}", style(format!("-{line}")).red());
            }
            for line in &new_lines[hunk.line1..hunk.line1 + hunk.inserted] {
                println!("{}", style(format!("+{line}")).green());
            }
        }
        Ok(())
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
