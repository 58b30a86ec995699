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
use crate::output;
use anyhow::{bail, Context, Result};
use clap::Parser;
use localhistory_config::Config;
use localhistory_storage::{ContentStorage, FileContentStorage, FileStorageOptions};
use tracing::info;

/// Rewrite the data file without dead space
///
/// Live handles keep their values, so the persisted history stays valid.
#[derive(Parser, Debug)]
pub struct CompactCmd {
    /// Only report how much space compaction would reclaim
    #[arg(long)]
    pub dry_run: bool,
}

impl CompactCmd {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let settings = &config.storage;
        if !settings.path.is_dir() {
            bail!("No local history found at {}", settings.path.display());
        }
        if self.dry_run {
            let stats = FileContentStorage::inspect(&settings.path, &settings.file_stem)
                .with_context(|| format!("Failed to read storage in {}", settings.path.display()))?;
            output::info(&format!(
                "Compaction would reclaim {} of {}",
                output::bytes(stats.wasted_bytes()),
                output::bytes(stats.data_bytes)
            ));
            return Ok(());
        }

        let mut storage = FileContentStorage::open(
            &settings.path,
            &settings.file_stem,
            FileStorageOptions {
                compaction_threshold: settings.compaction_threshold,
            },
        )
        .with_context(|| format!("Failed to open storage in {}", settings.path.display()))?;

        let before = storage.stats();
        let reclaimed = storage.compact().context("Compaction failed")?;
        storage.close()?;
        info!(reclaimed, records = before.live_records, "Compacted storage");
        output::success(&format!(
            "Reclaimed {} ({} live records kept)",
            output::bytes(reclaimed),
            before.live_records
        ));
        Ok(())
    }
}
