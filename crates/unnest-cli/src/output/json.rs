//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::Status;
use anyhow::Result;
use serde::Serialize;
use std::io;
use std::io::Write;
use unnest_core::RunStats;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_run_summary(&self, stats: &RunStats) -> Result<()> {
        let output = JsonOutput::success("unnest", stats);
        Self::output(&output)
    }

    fn format_aborted_summary(&self, stats: &RunStats, error: &str) -> Result<()> {
        let output = JsonOutput {
            operation: "unnest".to_string(),
            status: Status::Error,
            data: Some(stats),
            error: Some(error.to_string()),
        };
        Self::output(&output)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let stats = RunStats::new();
        let output = JsonOutput::success("unnest", &stats);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"operation\":\"unnest\""));
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"total_processed\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_error_envelope_keeps_partial_stats() {
        let stats = RunStats::new();
        let output = JsonOutput {
            operation: "unnest".to_string(),
            status: Status::Error,
            data: Some(&stats),
            error: Some("run aborted".to_string()),
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"error\":\"run aborted\""));
        assert!(json.contains("\"total_processed\""));
    }
}
