use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use na_core::{Article, CategoryConfig, Error, NewsConfig, Result, SourceDefinition, StatsDelta, StatsSink};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::fetch::PageFetcher;
use crate::scraper::SourceScraper;

/// Fetches allowed in flight at once across all sources.
pub const DEFAULT_CONCURRENCY: usize = 4;

pub const MISSING_QUERY_MESSAGE: &str = "Query parameter \"q\" is required";

/// Runs the source scrapers for whole categories and reports one stats
/// entry per public call.
///
/// Results keep configuration order (category, then source) whatever the
/// concurrency level.
pub struct ScraperManager {
    config: NewsConfig,
    scraper: SourceScraper,
    stats: Arc<dyn StatsSink>,
    semaphore: Arc<Semaphore>,
}

impl ScraperManager {
    pub fn new(config: NewsConfig, fetcher: Arc<dyn PageFetcher>, stats: Arc<dyn StatsSink>) -> Self {
        Self {
            config,
            scraper: SourceScraper::new(fetcher, stats.clone()),
            stats,
            semaphore: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
        }
    }

    /// Bounds parallel fetches. `1` scrapes strictly one source after another.
    pub fn with_concurrency(mut self, permits: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(permits.max(1)));
        self
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    /// Every configured `(category, source)` pair in scrape order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &SourceDefinition)> {
        self.config
            .categories
            .iter()
            .flat_map(|c| c.sources.iter().map(move |s| (c.key.as_str(), s)))
    }

    pub async fn get_category_news(&self, category: &str) -> Result<Vec<Article>> {
        let started = Instant::now();
        let config = self
            .config
            .category(category)
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))?;

        let articles = self.collect_category(config).await;
        info!("🗞️ {} articles for {}", articles.len(), category);
        self.report(articles.len(), started).await;
        Ok(articles)
    }

    pub async fn get_all_news(&self) -> Result<Vec<Article>> {
        let started = Instant::now();
        let articles = self.collect_all().await;
        info!("🗞️ {} articles across {} categories", articles.len(), self.config.categories.len());
        self.report(articles.len(), started).await;
        Ok(articles)
    }

    /// All news whose title or source contains `keyword`, ignoring case.
    pub async fn search_news(&self, keyword: &str) -> Result<Vec<Article>> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::Validation(MISSING_QUERY_MESSAGE.to_string()));
        }

        let started = Instant::now();
        let articles: Vec<Article> = self
            .collect_all()
            .await
            .into_iter()
            .filter(|article| article.matches_keyword(&needle))
            .collect();
        info!("🔍 {} articles match {:?}", articles.len(), keyword);
        self.report(articles.len(), started).await;
        Ok(articles)
    }

    async fn collect_all(&self) -> Vec<Article> {
        let categories = self.config.categories.iter().map(|c| self.collect_category(c));
        join_all(categories).await.into_iter().flatten().collect()
    }

    async fn collect_category(&self, category: &CategoryConfig) -> Vec<Article> {
        let sources = category.sources.iter().map(|source| async move {
            let _permit = self.semaphore.acquire().await.ok();
            self.scraper.scrape(source, &category.key).await
        });
        join_all(sources).await.into_iter().flatten().collect()
    }

    async fn report(&self, articles: usize, started: Instant) {
        let delta = StatsDelta::request(articles, started.elapsed());
        if let Err(e) = self.stats.accumulate(delta).await {
            warn!("⚠️ Failed to record stats: {}", e);
        }
    }
}
