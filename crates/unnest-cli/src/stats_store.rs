//! Persistent run statistics.
//!
//! Run history lives in a single JSON document: lifetime aggregate
//! counters plus the most recent runs, pruned to a fixed window. Writes go
//! through a temp file in the same directory followed by a rename, so a
//! crash never leaves a half-written history behind. A missing or
//! unparsable existing file starts a fresh history and never fails a run.

use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use unnest_core::ArchiveOutcome;
use unnest_core::RunStats;
use unnest_core::StatsSink;

/// Number of per-run records kept in the history file.
const MAX_RECENT_RUNS: usize = 100;

/// Schema version written to new history files.
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    /// Unix epoch seconds when the file was first created.
    created: u64,
    #[serde(default)]
    last_updated: Option<u64>,
    aggregated: AggregatedStats,
    recent_runs: Vec<RunRecord>,
}

impl HistoryFile {
    fn new_empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            created: unix_now(),
            last_updated: None,
            aggregated: AggregatedStats::default(),
            recent_runs: Vec::new(),
        }
    }
}

/// Lifetime counters folded across every recorded run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub total_runs: u64,
    pub first_run: Option<u64>,
    pub last_run: Option<u64>,
    pub lifetime_processed: u64,
    pub lifetime_successful: u64,
    pub lifetime_failed: u64,
    pub lifetime_skipped: u64,
    pub lifetime_archive_bytes: u64,
    pub lifetime_extracted_bytes: u64,
}

impl AggregatedStats {
    fn fold_run(&mut self, record: &RunRecord) {
        self.total_runs += 1;
        if self.first_run.is_none() {
            self.first_run = Some(record.timestamp);
        }
        self.last_run = Some(record.timestamp);
        self.lifetime_processed += record.stats.total_processed as u64;
        self.lifetime_successful += record.stats.successful as u64;
        self.lifetime_failed += record.stats.failed as u64;
        self.lifetime_skipped += record.stats.skipped as u64;
        self.lifetime_archive_bytes += record.stats.total_archive_bytes;
        self.lifetime_extracted_bytes += record.stats.total_extracted_bytes;
    }
}

/// One run as stored in the history file.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unix epoch seconds when the run finished.
    pub timestamp: u64,
    /// Directory the run processed.
    pub directory: PathBuf,
    /// Torrent name supplied by the invoking client, when given.
    pub torrent_name: Option<String>,
    /// Full statistics for the run.
    pub stats: RunStats,
}

/// Reads and rewrites the history file.
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the history, falling back to a fresh one when the file is
    /// missing or unreadable.
    fn load(&self) -> HistoryFile {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return HistoryFile::new_empty();
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read stats history, starting fresh"
                );
                return HistoryFile::new_empty();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "stats history is not valid JSON, starting fresh"
                );
                HistoryFile::new_empty()
            }
        }
    }

    /// Appends one run, prunes the history window, and rewrites the file.
    pub fn record_run(&self, record: RunRecord) -> io::Result<()> {
        let mut history = self.load();
        history.aggregated.fold_run(&record);
        history.recent_runs.push(record);
        if history.recent_runs.len() > MAX_RECENT_RUNS {
            let excess = history.recent_runs.len() - MAX_RECENT_RUNS;
            history.recent_runs.drain(..excess);
        }
        history.last_updated = Some(unix_now());
        self.write_atomic(&history)
    }

    fn write_atomic(&self, history: &HistoryFile) -> io::Result<()> {
        let json = serde_json::to_string_pretty(history).map_err(io::Error::other)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}

/// `StatsSink` that persists the finished run into the history file.
pub struct StatsFileSink {
    store: StatsStore,
    directory: PathBuf,
    torrent_name: Option<String>,
}

impl StatsFileSink {
    pub fn new(path: impl Into<PathBuf>, directory: PathBuf, torrent_name: Option<String>) -> Self {
        Self {
            store: StatsStore::new(path),
            directory,
            torrent_name,
        }
    }
}

impl StatsSink for StatsFileSink {
    fn on_outcome(&mut self, _outcome: &ArchiveOutcome) {}

    fn on_run_complete(&mut self, stats: &RunStats) {
        let record = RunRecord {
            timestamp: unix_now(),
            directory: self.directory.clone(),
            torrent_name: self.torrent_name.clone(),
            stats: stats.clone(),
        };
        if let Err(err) = self.store.record_run(record) {
            tracing::error!(error = %err, "failed to persist run statistics");
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
