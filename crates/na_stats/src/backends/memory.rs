use async_trait::async_trait;
use chrono::Utc;
use na_core::{Result, StatsDelta, StatsRecord, StatsSink};
use tokio::sync::Mutex;

/// Process-local counters, lost on exit.
pub struct MemoryStats {
    record: Mutex<StatsRecord>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self {
            record: Mutex::new(StatsRecord::new(Utc::now())),
        }
    }
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsSink for MemoryStats {
    async fn accumulate(&self, delta: StatsDelta) -> Result<()> {
        let mut record = self.record.lock().await;
        record.apply(delta, Utc::now());
        Ok(())
    }

    async fn snapshot(&self) -> Result<StatsRecord> {
        let mut record = self.record.lock().await.clone();
        record.refresh_uptime(Utc::now());
        Ok(record)
    }
}
