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
use anyhow::{bail, Result};
use clap::Parser;
use console::style;
use localhistory_config::Config;
use serde::Serialize;
use std::io::{self, Write};

/// List the revisions of one file, oldest first
#[derive(Parser, Debug)]
pub struct RevisionsCmd {
    /// Path of the file inside the history
    pub path: String,

    /// Print the content of the revision with this index
    #[arg(long, value_name = "INDEX")]
    pub show: Option<usize>,

    /// Track lines START..END of the latest revision back through every revision
    #[arg(long, value_name = "START..END", value_parser = parse_range)]
    pub track: Option<(usize, usize)>,

    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RevisionJson<'a> {
    index: usize,
    change_set: Option<u64>,
    label: Option<&'a str>,
    timestamp: i64,
    path: &'a str,
    size: usize,
}

fn parse_range(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{value}'"))?;
    let start = start.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<usize>().map_err(|e| e.to_string())?;
    if end < start {
        return Err(format!("range end {end} is before start {start}"));
    }
    Ok((start, end))
}

impl RevisionsCmd {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let history = open_history(config)?;
        let revisions = history.revisions(&self.path)?;

        if let Some(index) = self.show {
            let Some(revision) = revisions.get(index) else {
                bail!("{} has {} revisions, no index {index}", self.path, revisions.len());
            };
            let content = history.load_revision(revision)?;
            io::stdout().write_all(&content)?;
            return Ok(());
        }

        if let Some((start, end)) = self.track {
            let mut calc = history.selection_calculator(&self.path, start, end)?;
            for index in (0..revisions.len()).rev() {
                if !calc.can_calculate_for(index) {
                    output::info(&format!("Revision {index}: content no longer available"));
                    break;
                }
                let block = calc.selection_for(index)?;
                println!(
                    "{} lines {}..{}",
                    style(format!("[{index}]")).yellow(),
                    block.start(),
                    block.end()
                );
                for line in block.selected() {
                    println!("    {line}");
                }
            }
            return Ok(());
        }

        let mut rows = Vec::with_capacity(revisions.len());
        for (index, revision) in revisions.iter().enumerate() {
            rows.push(RevisionJson {
                index,
                change_set: revision.change_set_id,
                label: revision.label.as_deref(),
                timestamp: revision.timestamp,
                path: &revision.path,
                size: history.load_revision(revision)?.len(),
            });
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        for row in &rows {
            let origin = match row.change_set {
                Some(id) => format!("#{id}"),
                None => "initial".to_string(),
            };
            println!(
                "{} {} {} {} {}",
                style(format!("[{}]", row.index)).yellow(),
                output::timestamp(row.timestamp),
                style(origin).dim(),
                row.path,
                style(output::bytes(row.size as u64)).cyan()
            );
            if let Some(label) = row.label {
                println!("      {label}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("2..5"), Ok((2, 5)));
        assert!(parse_range("5..2").is_err());
        assert!(parse_range("7").is_err());
    }
}
