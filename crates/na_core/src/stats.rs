use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Counter increments reported by the scraping pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDelta {
    pub request_count: u64,
    pub article_count: u64,
    pub error_count: u64,
    pub response_time_ms: u64,
}

impl StatsDelta {
    /// One completed news request.
    pub fn request(articles: usize, elapsed: Duration) -> Self {
        Self {
            request_count: 1,
            article_count: articles as u64,
            response_time_ms: elapsed.as_millis() as u64,
            ..Default::default()
        }
    }

    /// One failed source.
    pub fn error() -> Self {
        Self {
            error_count: 1,
            ..Default::default()
        }
    }
}

/// Persisted statistics counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    /// Epoch milliseconds.
    pub start_time: i64,
    pub total_requests: u64,
    pub total_scraped_articles: u64,
    #[serde(default)]
    pub total_response_time_ms: u64,
    /// Milliseconds per request.
    pub average_response_time: f64,
    pub errors: u64,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub uptime_hours: f64,
}

impl StatsRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now.timestamp_millis(),
            total_requests: 0,
            total_scraped_articles: 0,
            total_response_time_ms: 0,
            average_response_time: 0.0,
            errors: 0,
            last_updated: now,
            uptime_hours: 0.0,
        }
    }

    pub fn apply(&mut self, delta: StatsDelta, now: DateTime<Utc>) {
        self.total_requests += delta.request_count;
        self.total_scraped_articles += delta.article_count;
        self.total_response_time_ms += delta.response_time_ms;
        self.errors += delta.error_count;
        self.average_response_time = if self.total_requests == 0 {
            0.0
        } else {
            self.total_response_time_ms as f64 / self.total_requests as f64
        };
        self.last_updated = now;
        self.refresh_uptime(now);
    }

    pub fn refresh_uptime(&mut self, now: DateTime<Utc>) {
        let elapsed_ms = (now.timestamp_millis() - self.start_time).max(0);
        self.uptime_hours = elapsed_ms as f64 / (1000.0 * 60.0 * 60.0);
    }
}

#[async_trait]
pub trait StatsSink: Send + Sync {
    /// Adds `delta` to the stored counters. Implementations serialize the
    /// read-modify-write so concurrent callers never lose increments.
    async fn accumulate(&self, delta: StatsDelta) -> Result<()>;

    /// Current counters with uptime computed at call time.
    async fn snapshot(&self) -> Result<StatsRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_apply_derives_average_and_uptime() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut record = StatsRecord::new(start);

        record.apply(StatsDelta::request(10, Duration::from_millis(300)), start);
        record.apply(StatsDelta::request(4, Duration::from_millis(100)), start);
        record.apply(StatsDelta::error(), Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap());

        assert_eq!(record.total_requests, 2);
        assert_eq!(record.total_scraped_articles, 14);
        assert_eq!(record.errors, 1);
        assert_eq!(record.average_response_time, 200.0);
        assert_eq!(record.uptime_hours, 3.0);
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let record = StatsRecord::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["startTime"], 1704067200000i64);
        assert_eq!(json["totalScrapedArticles"], 0);
        assert!(json.get("uptimeHours").is_some());
    }
}
