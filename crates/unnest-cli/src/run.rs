//! Drives one extraction run from parsed arguments and merged settings.

use crate::cli::Cli;
use crate::error::convert_run_aborted;
use crate::output::OutputFormatter;
use crate::progress::ProgressSink;
use crate::settings::Settings;
use crate::sink::FanoutSink;
use crate::stats_store::StatsFileSink;
use anyhow::Result;
use unnest_core::Extractor;
use unnest_core::StatsSink;

/// Runs the extraction and prints the summary.
///
/// Returns `Ok` for a completed run even when individual archives
/// failed; the summary carries those. An aborted run prints the partial
/// summary and returns the abort as an error so the process exits
/// non-zero.
pub fn execute(cli: &Cli, settings: &Settings, formatter: &dyn OutputFormatter) -> Result<()> {
    let span = match &cli.torrent_name {
        Some(name) => tracing::info_span!("run", torrent = %name),
        None => tracing::info_span!("run"),
    };
    let _entered = span.enter();

    let mut sinks: Vec<Box<dyn StatsSink>> = Vec::new();
    if settings.progress_indicators && !cli.quiet && !cli.json && ProgressSink::should_show() {
        sinks.push(Box::new(ProgressSink::new()));
    }
    if let Some(stats_file) = &settings.stats_file {
        sinks.push(Box::new(StatsFileSink::new(
            stats_file.clone(),
            cli.directory.clone(),
            cli.torrent_name.clone(),
        )));
    }

    let mut extractor = Extractor::with_sink(settings.extraction_config(), FanoutSink::new(sinks));
    match extractor.extract_all(&cli.directory) {
        Ok(stats) => {
            if !cli.quiet {
                formatter.format_run_summary(&stats)?;
            }
            Ok(())
        }
        Err(aborted) => {
            if !cli.quiet {
                formatter.format_aborted_summary(&aborted.stats, &aborted.to_string())?;
            }
            Err(convert_run_aborted(aborted))
        }
    }
}
