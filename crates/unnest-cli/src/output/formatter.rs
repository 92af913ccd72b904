//! Output formatter trait for run results.

use anyhow::Result;
use serde::Serialize;
use unnest_core::RunStats;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the summary of a completed run
    fn format_run_summary(&self, stats: &RunStats) -> Result<()>;

    /// Format the partial summary of an aborted run
    fn format_aborted_summary(&self, stats: &RunStats, error: &str) -> Result<()>;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}
