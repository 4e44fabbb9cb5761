pub mod cli;
pub mod date;
pub mod dom;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod manager;
pub mod scraper;
pub mod urls;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use fetch::{HttpFetcher, PageFetcher, DEFAULT_TIMEOUT};
pub use logging::{init_logging, Logger};
pub use manager::{ScraperManager, DEFAULT_CONCURRENCY};
pub use scraper::SourceScraper;

pub mod prelude {
    pub use super::fetch::PageFetcher;
    pub use super::manager::ScraperManager;
    pub use na_core::{Article, Error, NewsConfig, Result};
}
