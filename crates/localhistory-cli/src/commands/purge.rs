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
use localhistory_versioning::now_millis;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Drop change sets older than the retention period
#[derive(Parser, Debug)]
pub struct PurgeCmd {
    /// Retention in days (defaults to `history.max_age_days`)
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,
}

impl PurgeCmd {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let mut history = open_history(config)?;
        let report = match self.days {
            Some(days) => history.purge_obsolete(now_millis() - i64::from(days) * MILLIS_PER_DAY)?,
            None => history.purge_expired()?,
        };
        history.close()?;

        if report.sets_removed == 0 {
            output::info("Nothing to purge");
        } else {
            output::success(&format!(
                "Purged {} change sets ({} changes, {} content records released)",
                report.sets_removed, report.changes_removed, report.handles_released
            ));
        }
        Ok(())
    }
}
