use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use na_core::{Result, StatsRecord, StatsSink};

pub mod backends;

pub use backends::file::DEFAULT_STATS_FILE;
pub use backends::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatsBackend {
    /// Counters live only as long as the process
    Memory,
    /// Counters persisted to a JSON file
    #[default]
    File,
}

/// Builds the sink for `kind`. `path` only matters for the file backend and
/// defaults to [`DEFAULT_STATS_FILE`].
pub async fn create_stats(kind: StatsBackend, path: Option<&Path>) -> Result<Arc<dyn StatsSink>> {
    let sink: Arc<dyn StatsSink> = match kind {
        StatsBackend::Memory => Arc::new(MemoryStats::new()),
        StatsBackend::File => {
            let path = path.unwrap_or_else(|| Path::new(DEFAULT_STATS_FILE));
            Arc::new(FileStats::open(path).await?)
        }
    };
    Ok(sink)
}

/// Human-readable statistics block.
pub fn render_report(record: &StatsRecord) -> String {
    let start = DateTime::<Utc>::from_timestamp_millis(record.start_time)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| record.start_time.to_string());

    [
        "===== News Aggregator Statistics =====".to_string(),
        format!("Start Time: {}", start),
        format!("Uptime: {:.2} hours", record.uptime_hours),
        format!("Total Requests: {}", record.total_requests),
        format!("Total Scraped Articles: {}", record.total_scraped_articles),
        format!("Average Response Time: {:.2}ms", record.average_response_time),
        format!("Errors: {}", record.errors),
        format!("Last Updated: {}", record.last_updated.format("%Y-%m-%d %H:%M:%S UTC")),
        "======================================".to_string(),
    ]
    .join("\n")
}
