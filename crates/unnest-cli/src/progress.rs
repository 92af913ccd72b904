//! Progress display driven by run outcomes.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::time::Duration;
use unnest_core::ArchiveOutcome;
use unnest_core::Disposition;
use unnest_core::RunStats;
use unnest_core::StatsSink;

/// Spinner advanced once per archive outcome.
///
/// The total number of archives is not known up front because extraction
/// can queue nested archives mid-run, so this shows a running count
/// rather than a bounded bar. Cleans up automatically on drop.
pub struct ProgressSink {
    bar: ProgressBar,
    extracted: usize,
    failed: usize,
    skipped: usize,
}

impl ProgressSink {
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} archives  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            bar,
            extracted: 0,
            failed: 0,
            skipped: 0,
        }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressSink {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl StatsSink for ProgressSink {
    fn on_outcome(&mut self, outcome: &ArchiveOutcome) {
        match outcome.disposition {
            Disposition::Extracted => self.extracted += 1,
            Disposition::Failed => self.failed += 1,
            Disposition::Skipped => self.skipped += 1,
        }

        let name = outcome.path.file_name().map_or_else(
            || outcome.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        self.bar.set_message(format!(
            "{} extracted, {} failed, {} skipped - {name}",
            self.extracted, self.failed, self.skipped
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&mut self, _stats: &RunStats) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome(disposition: Disposition) -> ArchiveOutcome {
        ArchiveOutcome {
            path: PathBuf::from("/downloads/show.zip"),
            kind: None,
            depth: 0,
            archive_bytes: 0,
            extracted_bytes: 0,
            files_extracted: 0,
            elapsed_secs: 0.0,
            disposition,
            error_kind: None,
            error: None,
        }
    }

    #[test]
    fn test_outcomes_advance_the_spinner() {
        let mut sink = ProgressSink::new();
        sink.on_outcome(&outcome(Disposition::Extracted));
        sink.on_outcome(&outcome(Disposition::Failed));
        sink.on_outcome(&outcome(Disposition::Skipped));

        assert_eq!(sink.bar.position(), 3);
        assert_eq!(sink.extracted, 1);
        assert_eq!(sink.failed, 1);
        assert_eq!(sink.skipped, 1);
    }

    #[test]
    fn test_completion_clears_the_spinner() {
        let mut sink = ProgressSink::new();
        sink.on_outcome(&outcome(Disposition::Extracted));
        sink.on_run_complete(&RunStats::new());
        assert!(sink.bar.is_finished());
    }
}
