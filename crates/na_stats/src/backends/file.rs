use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use na_core::{Error, Result, StatsDelta, StatsRecord, StatsSink};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default location of the persisted counters.
pub const DEFAULT_STATS_FILE: &str = "project-stats.json";

/// Counters persisted as pretty-printed JSON.
///
/// Every accumulate re-reads the file, so counters written by an earlier
/// process keep growing. Writes go to a sibling temp file that is renamed
/// over the original.
pub struct FileStats {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStats {
    /// Opens `path`, creating it with a fresh record if it does not exist.
    /// An existing file that does not parse is an error.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let stats = Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        };

        if fs::try_exists(&stats.path).await? {
            stats.read().await?;
            debug!("Using stats file {}", stats.path.display());
        } else {
            if let Some(parent) = stats.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            stats.write(&StatsRecord::new(Utc::now())).await?;
            info!("📊 Created stats file {}", stats.path.display());
        }
        Ok(stats)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StatsRecord> {
        let raw = fs::read_to_string(&self.path).await?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Stats(format!("{} is not a stats record: {}", self.path.display(), e)))
    }

    async fn write(&self, record: &StatsRecord) -> Result<()> {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, serde_json::to_string_pretty(record)?).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StatsSink for FileStats {
    async fn accumulate(&self, delta: StatsDelta) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut record = self.read().await?;
        record.apply(delta, Utc::now());
        self.write(&record).await?;
        debug!("Updated stats: {:?}", delta);
        Ok(())
    }

    async fn snapshot(&self) -> Result<StatsRecord> {
        let _guard = self.lock.lock().await;
        let mut record = self.read().await?;
        record.refresh_uptime(Utc::now());
        Ok(record)
    }
}
