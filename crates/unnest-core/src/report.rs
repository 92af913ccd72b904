//! Run statistics and per-archive outcome reporting.

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::detect::ArchiveKind;
use crate::error::ErrorKind;

/// Final disposition of one archive after a run visited it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// The archive was extracted successfully.
    Extracted,
    /// The archive was skipped without being treated as a failure.
    Skipped,
    /// The archive failed validation or extraction.
    Failed,
}

/// Outcome of processing a single archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    /// Path of the archive that was processed.
    pub path: PathBuf,

    /// Detected archive format, if detection succeeded.
    pub kind: Option<ArchiveKind>,

    /// Nesting depth at which the archive was found (0 for the scan root).
    pub depth: usize,

    /// Size of the archive file on disk in bytes.
    pub archive_bytes: u64,

    /// Total bytes written while extracting this archive.
    pub extracted_bytes: u64,

    /// Number of files extracted from this archive.
    pub files_extracted: usize,

    /// Wall-clock seconds spent on this archive.
    pub elapsed_secs: f64,

    /// Final disposition of the archive.
    pub disposition: Disposition,

    /// Error classification when the archive was skipped or failed.
    pub error_kind: Option<ErrorKind>,

    /// Human-readable error message when the archive was skipped or failed.
    pub error: Option<String>,
}

/// Aggregate statistics for one extraction run.
///
/// Produced by [`Extractor::extract_all`](crate::Extractor::extract_all). The
/// counters always satisfy `total_processed == successful + failed`; skipped
/// archives are counted separately and never contribute to `total_processed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Archives that were actually worked on (extracted or failed).
    pub total_processed: usize,

    /// Archives extracted without error.
    pub successful: usize,

    /// Archives that failed validation or extraction.
    pub failed: usize,

    /// Archives skipped without being treated as failures.
    pub skipped: usize,

    /// One message per failed archive, in processing order.
    pub errors: Vec<String>,

    /// Per-archive outcomes, in processing order.
    pub archives: Vec<ArchiveOutcome>,

    /// Combined on-disk size of all processed archives in bytes.
    pub total_archive_bytes: u64,

    /// Combined bytes written across all successful extractions.
    pub total_extracted_bytes: u64,

    /// Wall-clock duration of the whole run in seconds.
    pub duration_secs: f64,
}

impl RunStats {
    /// Creates a new empty stats record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether any archive failed during the run.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns the number of archives the run looked at, including skips.
    #[must_use]
    pub fn total_seen(&self) -> usize {
        self.total_processed + self.skipped
    }

    /// Folds one archive outcome into the aggregate counters.
    pub(crate) fn record(&mut self, outcome: ArchiveOutcome) {
        match outcome.disposition {
            Disposition::Extracted => {
                self.total_processed += 1;
                self.successful += 1;
                self.total_archive_bytes += outcome.archive_bytes;
                self.total_extracted_bytes += outcome.extracted_bytes;
            }
            Disposition::Failed => {
                self.total_processed += 1;
                self.failed += 1;
                self.total_archive_bytes += outcome.archive_bytes;
                if let Some(message) = &outcome.error {
                    self.errors
                        .push(format!("{}: {message}", outcome.path.display()));
                }
            }
            Disposition::Skipped => {
                self.skipped += 1;
            }
        }
        self.archives.push(outcome);
    }
}

/// Sink for observing a run as it progresses.
///
/// Implement this trait to stream per-archive outcomes into a progress
/// display or a persistent store. The trait requires `Send` so sinks can be
/// handed across threads by callers that drive runs from a worker.
///
/// # Examples
///
/// ```
/// use unnest_core::{ArchiveOutcome, RunStats, StatsSink};
///
/// struct PrintSink;
///
/// impl StatsSink for PrintSink {
///     fn on_outcome(&mut self, outcome: &ArchiveOutcome) {
///         println!("{}: {:?}", outcome.path.display(), outcome.disposition);
///     }
///
///     fn on_run_complete(&mut self, stats: &RunStats) {
///         println!("{} extracted, {} failed", stats.successful, stats.failed);
///     }
/// }
/// ```
pub trait StatsSink: Send {
    /// Called after each archive reaches a final disposition.
    fn on_outcome(&mut self, outcome: &ArchiveOutcome);

    /// Called once when the run finishes, even when it aborts early.
    fn on_run_complete(&mut self, stats: &RunStats);
}

/// No-op implementation of [`StatsSink`] that discards every event.
///
/// Use this when you don't need run observation but the API requires
/// a sink implementation.
#[derive(Debug, Default)]
pub struct NoopStatsSink;

impl StatsSink for NoopStatsSink {
    fn on_outcome(&mut self, _outcome: &ArchiveOutcome) {}

    fn on_run_complete(&mut self, _stats: &RunStats) {}
}
