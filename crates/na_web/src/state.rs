use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use na_core::StatsSink;
use na_scrapers::ScraperManager;

pub struct AppState {
    pub manager: Arc<ScraperManager>,
    pub stats: Arc<dyn StatsSink>,
    pub started_at: Instant,
    /// Served for every path no API route claims.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(manager: Arc<ScraperManager>, stats: Arc<dyn StatsSink>) -> Self {
        Self {
            manager,
            stats,
            started_at: Instant::now(),
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}
