pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use config::{placeholder_image, CategoryConfig, NewsConfig};
pub use error::{Error, Result};
pub use stats::{StatsDelta, StatsRecord, StatsSink};
pub use types::{Article, SelectorList, SourceDefinition, SourceSelectors};
