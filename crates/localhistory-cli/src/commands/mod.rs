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
// Subcommands of the lhist binary
pub mod compact;
pub mod diff;
pub mod log;
pub mod purge;
pub mod revisions;
pub mod stats;

pub use compact::CompactCmd;
pub use diff::DiffCmd;
pub use log::LogCmd;
pub use purge::PurgeCmd;
pub use revisions::RevisionsCmd;
pub use stats::StatsCmd;
