//! Recursive extraction driver.
//!
//! Walks a directory for archives, validates each candidate, extracts it
//! next to itself, and feeds archives found among the extracted files
//! back into an explicit work queue tagged with their nesting depth.
//! Discovered archives flow through the queue instead of repeated
//! directory rescans, and a processed set guarantees each path is
//! visited at most once per run.

use std::collections::HashSet;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::ExtractionConfig;
use crate::detect::ArchiveKind;
use crate::detect::detect_kind;
use crate::error::ExtractionError;
use crate::error::RunAborted;
use crate::formats::handler_for;
use crate::report::ArchiveOutcome;
use crate::report::Disposition;
use crate::report::NoopStatsSink;
use crate::report::RunStats;
use crate::report::StatsSink;
use crate::scan::find_archives;
use crate::security::TargetDir;
use crate::validate::check_nested_depth;
use crate::validate::validate_archive;

/// One archive waiting in the work queue, tagged with the nesting depth
/// at which it was discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueueItem {
    path: PathBuf,
    depth: usize,
}

/// Drives a full extraction run over a download directory.
///
/// Construction takes the run configuration and, optionally, a
/// [`StatsSink`] that observes per-archive outcomes as they happen.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use unnest_core::ExtractionConfig;
/// use unnest_core::Extractor;
///
/// let mut extractor = Extractor::new(ExtractionConfig::default());
/// let stats = extractor.extract_all(Path::new("/downloads/complete"))?;
/// println!("{} archives extracted", stats.successful);
/// # Ok::<(), unnest_core::RunAborted>(())
/// ```
pub struct Extractor {
    config: ExtractionConfig,
    sink: Box<dyn StatsSink>,
}

impl Extractor {
    /// Creates an extractor that runs without outcome observation.
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        Self::with_sink(config, NoopStatsSink)
    }

    /// Creates an extractor that reports each outcome to `sink`.
    #[must_use]
    pub fn with_sink(config: ExtractionConfig, sink: impl StatsSink + 'static) -> Self {
        Self {
            config,
            sink: Box::new(sink),
        }
    }

    /// Returns the configuration this extractor runs with.
    #[must_use]
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts every archive under `directory`, recursing into archives
    /// produced by earlier extractions.
    ///
    /// Each archive is extracted into the directory it lives in, so
    /// nested archives unpack next to themselves. Bad archives are
    /// classified, logged, and stepped over; with `skip_on_error`
    /// disabled the first failure-class error stops the run instead.
    ///
    /// # Errors
    ///
    /// Returns [`RunAborted`] when `directory` is not a writable
    /// directory, or when `skip_on_error` is off and an archive fails.
    /// The abort carries the statistics accumulated so far.
    pub fn extract_all(&mut self, directory: &Path) -> Result<RunStats, RunAborted> {
        let started = Instant::now();
        let mut stats = RunStats::new();

        let root = match TargetDir::new(directory) {
            Ok(root) => root,
            Err(source) => {
                self.sink.on_run_complete(&stats);
                return Err(RunAborted {
                    archive: directory.to_path_buf(),
                    stats,
                    source,
                });
            }
        };

        let candidates = find_archives(root.as_path(), &self.config);
        tracing::info!(
            directory = %root.as_path().display(),
            candidates = candidates.len(),
            "starting extraction run"
        );

        let mut queue: VecDeque<QueueItem> = candidates
            .into_iter()
            .map(|path| QueueItem { path, depth: 0 })
            .collect();
        let mut processed: HashSet<PathBuf> = HashSet::new();

        while let Some(item) = queue.pop_front() {
            if !processed.insert(item.path.clone()) {
                tracing::debug!(
                    archive = %item.path.display(),
                    "archive already visited this run"
                );
                continue;
            }

            let (outcome, error) = self.process_queued(&item, &mut queue);
            self.sink.on_outcome(&outcome);

            let failed = outcome.disposition == Disposition::Failed;
            stats.record(outcome);

            if failed && !self.config.skip_on_error {
                let source = error.unwrap_or_else(|| {
                    ExtractionError::Io(std::io::Error::other(
                        "archive failed without a recorded error",
                    ))
                });
                stats.duration_secs = started.elapsed().as_secs_f64();
                self.sink.on_run_complete(&stats);
                tracing::error!(
                    archive = %item.path.display(),
                    "aborting run on first failure"
                );
                return Err(RunAborted {
                    archive: item.path,
                    stats,
                    source,
                });
            }
        }

        stats.duration_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            extracted = stats.successful,
            failed = stats.failed,
            skipped = stats.skipped,
            "extraction run complete"
        );
        self.sink.on_run_complete(&stats);
        Ok(stats)
    }

    /// Validates and extracts one queued archive, pushing any archives
    /// it produced onto the queue at the next depth.
    fn process_queued(
        &self,
        item: &QueueItem,
        queue: &mut VecDeque<QueueItem>,
    ) -> (ArchiveOutcome, Option<ExtractionError>) {
        let started = Instant::now();
        let archive_bytes = fs::metadata(&item.path).map(|meta| meta.len()).unwrap_or(0);

        if let Err(err) = check_nested_depth(item.depth, &self.config) {
            tracing::info!(
                archive = %item.path.display(),
                depth = item.depth,
                "skipping archive beyond nesting limit"
            );
            let outcome = error_outcome(item, detect_kind(&item.path), archive_bytes, started, &err);
            return (outcome, Some(err));
        }

        let validation = validate_archive(&item.path, &self.config);
        let kind = validation.kind;
        if let Some(err) = validation.error {
            log_rejection(&item.path, &err, "validation");
            return (error_outcome(item, kind, archive_bytes, started, &err), Some(err));
        }
        let Some(kind) = kind else {
            // A passing validation always carries the detected kind;
            // treat a missing one as unrecognized.
            let err = ExtractionError::UnsupportedType;
            return (error_outcome(item, None, archive_bytes, started, &err), Some(err));
        };

        let Some(dest) = item.path.parent().map(Path::to_path_buf) else {
            let err = ExtractionError::Io(std::io::Error::other(format!(
                "archive has no parent directory: {}",
                item.path.display()
            )));
            return (
                error_outcome(item, Some(kind), archive_bytes, started, &err),
                Some(err),
            );
        };

        match handler_for(kind).extract(&item.path, &dest) {
            Ok(report) => {
                tracing::info!(
                    archive = %item.path.display(),
                    files = report.files_extracted,
                    bytes = report.bytes_written,
                    "extracted archive"
                );

                if !self.config.preserve_originals {
                    self.delete_source(&item.path);
                }

                for nested in &report.nested_archives {
                    let enabled =
                        detect_kind(nested).is_some_and(|found| self.config.allows_kind(found));
                    if enabled {
                        tracing::debug!(
                            archive = %nested.display(),
                            depth = item.depth + 1,
                            "queueing nested archive"
                        );
                        queue.push_back(QueueItem {
                            path: nested.clone(),
                            depth: item.depth + 1,
                        });
                    }
                }

                let outcome = ArchiveOutcome {
                    path: item.path.clone(),
                    kind: Some(kind),
                    depth: item.depth,
                    archive_bytes,
                    extracted_bytes: report.bytes_written,
                    files_extracted: report.files_extracted,
                    elapsed_secs: started.elapsed().as_secs_f64(),
                    disposition: Disposition::Extracted,
                    error_kind: None,
                    error: None,
                };
                (outcome, None)
            }
            Err(err) => {
                log_rejection(&item.path, &err, "extraction");
                (
                    error_outcome(item, Some(kind), archive_bytes, started, &err),
                    Some(err),
                )
            }
        }
    }

    /// Removes a successfully extracted source archive.
    ///
    /// A failed delete never fails the archive; the extraction already
    /// succeeded and the file is merely left behind.
    fn delete_source(&self, archive: &Path) {
        match fs::remove_file(archive) {
            Ok(()) => {
                tracing::debug!(archive = %archive.display(), "deleted source archive");
            }
            Err(err) => {
                tracing::warn!(
                    archive = %archive.display(),
                    error = %err,
                    "failed to delete source archive"
                );
            }
        }
    }
}

fn error_outcome(
    item: &QueueItem,
    kind: Option<ArchiveKind>,
    archive_bytes: u64,
    started: Instant,
    err: &ExtractionError,
) -> ArchiveOutcome {
    let disposition = if err.is_failure() {
        Disposition::Failed
    } else {
        Disposition::Skipped
    };
    ArchiveOutcome {
        path: item.path.clone(),
        kind,
        depth: item.depth,
        archive_bytes,
        extracted_bytes: 0,
        files_extracted: 0,
        elapsed_secs: started.elapsed().as_secs_f64(),
        disposition,
        error_kind: Some(err.kind()),
        error: Some(err.to_string()),
    }
}

fn log_rejection(archive: &Path, err: &ExtractionError, stage: &str) {
    if err.is_failure() {
        tracing::error!(
            archive = %archive.display(),
            error = %err,
            stage,
            "archive failed"
        );
    } else {
        tracing::info!(
            archive = %archive.display(),
            reason = %err,
            "skipping archive"
        );
    }
}
