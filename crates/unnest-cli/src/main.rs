//! Unnest CLI - Command-line tool for safe recursive extraction of
//! archives in finished torrent downloads.

mod cli;
mod error;
mod logging;
mod output;
mod progress;
mod run;
mod settings;
mod sink;
mod stats_store;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let settings = settings::Settings::load(&cli)?;
    let _guard = logging::init(settings.log_dir.as_deref(), cli.verbose, cli.quiet)?;

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    run::execute(&cli, &settings, &*formatter)
}
