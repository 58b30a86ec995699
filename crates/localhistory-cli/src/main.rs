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
//! `lhist`: inspect and maintain a local history store

mod commands;
mod context;
mod output;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use localhistory_config::Config;
use localhistory_observability::{init_tracing_with_config, LogConfig, LogFormat};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lhist")]
#[command(version, about = "Inspect and maintain a local history store")]
#[command(
    long_about = "lhist reads the change log, revisions and content store that a local \
history engine keeps for a project, and performs storage maintenance on it."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// History directory or configuration file
    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        default_value = ".localhistory"
    )]
    config: PathBuf,

    /// Log filter, e.g. `debug` or `localhistory_storage=trace`
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Log format (pretty|compact|json)
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<String>,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the line hunks between two text files
    Diff(DiffCmd),

    /// Show storage and history statistics
    Stats(StatsCmd),

    /// Rewrite the content store without dead space
    Compact(CompactCmd),

    /// List recorded change sets
    Log(LogCmd),

    /// List the revisions of a file
    Revisions(RevisionsCmd),

    /// Drop change sets older than the retention period
    Purge(PurgeCmd),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        output::error(&format!("Error: {err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        other => bail!("Invalid color option: {other}"),
    }

    if let Commands::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "lhist", &mut io::stdout());
        return Ok(());
    }

    let config = context::load_config(&cli.config)?;
    init_logging(&cli, &config)?;

    match &cli.command {
        Commands::Diff(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config),
        Commands::Compact(cmd) => cmd.execute(&config),
        Commands::Log(cmd) => cmd.execute(&config),
        Commands::Revisions(cmd) => cmd.execute(&config),
        Commands::Purge(cmd) => cmd.execute(&config),
        Commands::Completions { .. } => Ok(()),
    }
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut log_config = LogConfig::from_settings(&config.logging)
        .context("Invalid logging settings in configuration")?
        .with_color(console::colors_enabled_stderr());
    if let Some(format) = &cli.log_format {
        let format: LogFormat = format.parse().context("Invalid --log-format")?;
        log_config = log_config.with_format(format);
    }
    if let Some(level) = &cli.log_level {
        log_config = log_config.with_level(level.clone());
    }
    init_tracing_with_config(&log_config).context("Failed to initialize logging")?;
    Ok(())
}
