//! Stats sink composition.

use unnest_core::ArchiveOutcome;
use unnest_core::RunStats;
use unnest_core::StatsSink;

/// Forwards every run event to each wrapped sink in order.
///
/// The extractor takes a single sink; this is how the progress display
/// and the statistics store observe the same run.
pub struct FanoutSink {
    sinks: Vec<Box<dyn StatsSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn StatsSink>>) -> Self {
        Self { sinks }
    }
}

impl StatsSink for FanoutSink {
    fn on_outcome(&mut self, outcome: &ArchiveOutcome) {
        for sink in &mut self.sinks {
            sink.on_outcome(outcome);
        }
    }

    fn on_run_complete(&mut self, stats: &RunStats) {
        for sink in &mut self.sinks {
            sink.on_run_complete(stats);
        }
    }
}
