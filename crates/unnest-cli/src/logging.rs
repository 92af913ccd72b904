//! Tracing setup for the CLI.
//!
//! Messages always go to stderr at a level derived from the verbosity
//! flags. When a log directory is configured, a daily rotating file log
//! is layered on top so unattended runs (for example from a torrent
//! client's completion hook) leave a persistent record.

use anyhow::Context;
use anyhow::Result;
use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global tracing subscriber.
///
/// The `UNNEST_LOG` environment variable overrides the flag-derived
/// level with a full filter directive string. The returned guard must be
/// held for the life of the process; dropping it flushes the buffered
/// file writer.
///
/// A second call in the same process is a no-op, which keeps in-process
/// tests from stepping on each other.
pub fn init(log_dir: Option<&Path>, verbose: bool, quiet: bool) -> Result<Option<WorkerGuard>> {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_env("UNNEST_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    match log_dir {
        Some(dir) => {
            // rolling::daily panics when the directory cannot be created,
            // so prepare it here and surface the failure as an error.
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let file_appender = rolling::daily(dir, "unnest.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init();
            Ok(Some(guard))
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init();
            Ok(None)
        }
    }
}
