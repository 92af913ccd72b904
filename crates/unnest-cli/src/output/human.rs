//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use unnest_core::Disposition;
use unnest_core::RunStats;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn disposition_label(disposition: Disposition) -> &'static str {
        match disposition {
            Disposition::Extracted => "extracted",
            Disposition::Skipped => "skipped",
            Disposition::Failed => "failed",
        }
    }

    fn write_counts(&self, stats: &RunStats) {
        let _ = self
            .term
            .write_line(&format!("  Archives extracted: {}", stats.successful));
        let _ = self
            .term
            .write_line(&format!("  Failed: {}", stats.failed));
        let _ = self
            .term
            .write_line(&format!("  Skipped: {}", stats.skipped));
        let _ = self.term.write_line(&format!(
            "  Archive size: {}",
            Self::format_size(stats.total_archive_bytes)
        ));
        let _ = self.term.write_line(&format!(
            "  Extracted size: {}",
            Self::format_size(stats.total_extracted_bytes)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration: {:.1}s", stats.duration_secs));
            for outcome in &stats.archives {
                let _ = self.term.write_line(&format!(
                    "  {} {} (depth {})",
                    Self::disposition_label(outcome.disposition),
                    outcome.path.display(),
                    outcome.depth
                ));
            }
        }

        if !stats.errors.is_empty() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{}", style("Errors:").red().bold()));
            } else {
                let _ = self.term.write_line("Errors:");
            }
            for error in &stats.errors {
                let _ = self.term.write_line(&format!("  - {error}"));
            }
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_run_summary(&self, stats: &RunStats) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if stats.has_failures() {
            if self.use_colors {
                let _ = self.term.write_line(&format!(
                    "{} Extraction finished with failures",
                    style("⚠").yellow().bold()
                ));
            } else {
                let _ = self.term.write_line("Extraction finished with failures");
            }
        } else if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Extraction complete",
                style("✓").green().bold()
            ));
        } else {
            let _ = self.term.write_line("Extraction complete");
        }

        self.write_counts(stats);

        Ok(())
    }

    fn format_aborted_summary(&self, stats: &RunStats, _error: &str) -> Result<()> {
        // The abort reason itself reaches stderr through main's error path
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} Run aborted", style("✗").red().bold()));
        } else {
            let _ = self.term.write_line("Run aborted");
        }

        self.write_counts(stats);

        Ok(())
    }
}
