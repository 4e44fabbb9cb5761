use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::types::{SelectorList, SourceDefinition, SourceSelectors};
use crate::{Error, Result};

pub const GENERAL_CATEGORY: &str = "general";

/// Category order used by the combined news listing.
pub const CATEGORY_ORDER: [&str; 8] = [
    "singapore",
    "malaysia",
    "business",
    "technology",
    "sports",
    "entertainment",
    "health",
    "science",
];

const PLACEHOLDER_IMAGES: &[(&str, &str)] = &[
    (GENERAL_CATEGORY, "https://placehold.co/600x400/2563eb/white?text=General+News"),
    ("singapore", "https://placehold.co/600x400/0ea5e9/white?text=Singapore+News"),
    ("malaysia", "https://placehold.co/600x400/8b5cf6/white?text=Malaysia+News"),
    ("business", "https://placehold.co/600x400/10b981/white?text=Business+News"),
    ("technology", "https://placehold.co/600x400/f59e0b/white?text=Tech+News"),
    ("sports", "https://placehold.co/600x400/ef4444/white?text=Sports+News"),
    ("entertainment", "https://placehold.co/600x400/ec4899/white?text=Entertainment"),
];

/// Returns the dedicated placeholder for `category`, if one exists.
pub fn dedicated_placeholder(category: &str) -> Option<&'static str> {
    PLACEHOLDER_IMAGES
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, url)| *url)
}

/// Placeholder image for articles without one. Categories with no entry
/// of their own share the general placeholder.
pub fn placeholder_image(category: &str) -> &'static str {
    dedicated_placeholder(category)
        .or_else(|| dedicated_placeholder(GENERAL_CATEGORY))
        .unwrap_or_default()
}

struct BuiltinSource {
    name: &'static str,
    url: &'static str,
    container: &'static str,
    title: &'static str,
    link: &'static str,
    image: &'static str,
    date: &'static str,
}

const SINGAPORE: &[BuiltinSource] = &[
    BuiltinSource {
        name: "Channel NewsAsia",
        url: "https://www.channelnewsasia.com",
        container: ".list-object, .media-object, article",
        title: "h6 a, h3 a, .list-object__heading a, h1 a, h2",
        link: ".list-object__heading a, h6 a, h3 a, a[href]",
        image: "picture img, img.image, img",
        date: ".timestamp, .list-object__datetime-duration, time",
    },
    BuiltinSource {
        name: "The Straits Times",
        url: "https://www.straitstimes.com",
        container: ".card, .story-card, article",
        title: ".card-title a, h5 a, h3 a, h2 a, h1 a",
        link: ".card-title a, a.stretched-link, a[href]",
        image: ".card-img-top img, picture img, img",
        date: ".card-time, .story-postdate, time",
    },
];

const MALAYSIA: &[BuiltinSource] = &[
    BuiltinSource {
        name: "The Star",
        url: "https://www.thestar.com.my",
        container: ".story-list li, .focus-story, article, .in-sec-story",
        title: "h2 a, h3 a, .f18 a",
        link: "h2 a, h3 a, a[href]",
        image: ".thumb img, img",
        date: ".timestamp, time, .date",
    },
    BuiltinSource {
        name: "Malay Mail",
        url: "https://www.malaymail.com",
        container: "article, .article-item, .col-md-3",
        title: "h2 a, h3 a, .article-title a",
        link: "h2 a, h3 a, a[href]",
        image: ".article-image img, img",
        date: ".article-date, time",
    },
];

const BUSINESS: &[BuiltinSource] = &[
    BuiltinSource {
        name: "CNBC",
        url: "https://www.cnbc.com",
        container: ".Card-standardBreakerCard, .LatestNews-item, .RiverHeadline-container, article",
        title: ".Card-title, .LatestNews-headline, h2 a, h3 a",
        link: "a.Card-title, a.LatestNews-headline, h2 a, h3 a, a[href]",
        image: ".Card-mediaContainer img, img",
        date: ".LatestNews-timestamp, time",
    },
    BuiltinSource {
        name: "Business Times",
        url: "https://www.businesstimes.com.sg",
        container: ".story-card, .card, article",
        title: "h3 a, h2 a, .card-title a",
        link: "h3 a, h2 a, a[href]",
        image: "img",
        date: ".timestamp, time",
    },
];

const TECHNOLOGY: &[BuiltinSource] = &[
    BuiltinSource {
        name: "TechCrunch",
        url: "https://techcrunch.com",
        container: ".wp-block-post, .loop-card, article",
        title: ".loop-card__title a, h3 a, h2 a",
        link: ".loop-card__title a, h3 a, h2 a, a[href]",
        image: ".loop-card__figure img, img",
        date: "time, .loop-card__meta time",
    },
    BuiltinSource {
        name: "The Verge",
        url: "https://www.theverge.com",
        container: ".duet--content-cards--content-card, article",
        title: "h2 a, h3 a",
        link: "h2 a, h3 a, a[href]",
        image: "img",
        date: "time",
    },
];

const SPORTS: &[BuiltinSource] = &[
    BuiltinSource {
        name: "ESPN",
        url: "https://www.espn.com",
        container: ".contentItem, article",
        title: ".contentItem__title, h1, h2",
        link: "a.contentItem__padding, a[href]",
        image: ".media-wrapper img, img",
        date: ".time-elapsed, time",
    },
    BuiltinSource {
        name: "BBC Sport",
        url: "https://www.bbc.com/sport",
        container: "[data-testid='promo'], .ssrcss-promo, article",
        title: "[data-testid='card-headline'], h3, h2",
        link: "a[href]",
        image: "img",
        date: "time, [data-testid='card-metadata-lastupdated']",
    },
];

const ENTERTAINMENT: &[BuiltinSource] = &[
    BuiltinSource {
        name: "Variety",
        url: "https://variety.com",
        container: ".o-tease-list__item, .o-story, article",
        title: "h3 a, h2 a, .c-title a",
        link: "h3 a, h2 a, a[href]",
        image: "img",
        date: "time, .c-timestamp",
    },
    BuiltinSource {
        name: "The Hollywood Reporter",
        url: "https://www.hollywoodreporter.com",
        container: ".story, .lrv-u-flex, article",
        title: "h3 a, h2 a, .c-title a",
        link: "h3 a, h2 a, a[href]",
        image: "img",
        date: "time",
    },
];

const HEALTH: &[BuiltinSource] = &[
    BuiltinSource {
        name: "Medical News Today",
        url: "https://www.medicalnewstoday.com",
        container: "li.css-1ib8oek, .css-kbq0t, article",
        title: "h2, h3, a span",
        link: "a[href]",
        image: "img",
        date: "time",
    },
    BuiltinSource {
        name: "ScienceDaily Health",
        url: "https://www.sciencedaily.com/news/health_medicine",
        container: ".latest-head, #featured_blurbs .tab-pane div, article",
        title: "a, h3 a",
        link: "a[href]",
        image: "img",
        date: ".story-date, time",
    },
];

const SCIENCE: &[BuiltinSource] = &[
    BuiltinSource {
        name: "ScienceDaily",
        url: "https://www.sciencedaily.com",
        container: ".latest-head, #heroes .hero, article",
        title: "a, h3 a",
        link: "a[href]",
        image: "img",
        date: ".story-date, time",
    },
    BuiltinSource {
        name: "Phys.org",
        url: "https://phys.org",
        container: "article.sorted-article, article",
        title: "h3 a, h2 a, .news-link",
        link: "h3 a, a.news-link, a[href]",
        image: "figure img, img",
        date: ".article__info-item p, time",
    },
];

const BUILTIN_CATALOG: &[(&str, &[BuiltinSource])] = &[
    ("singapore", SINGAPORE),
    ("malaysia", MALAYSIA),
    ("business", BUSINESS),
    ("technology", TECHNOLOGY),
    ("sports", SPORTS),
    ("entertainment", ENTERTAINMENT),
    ("health", HEALTH),
    ("science", SCIENCE),
];

impl From<&BuiltinSource> for SourceDefinition {
    fn from(source: &BuiltinSource) -> Self {
        let mut selectors = SourceSelectors {
            container: SelectorList::parse(source.container),
            title: SelectorList::parse(source.title),
            link: SelectorList::parse(source.link),
            image: SelectorList::parse(source.image),
            date: SelectorList::parse(source.date),
        };
        selectors.fill_defaults();
        Self {
            name: source.name.to_string(),
            base_url: source.url.to_string(),
            selectors,
        }
    }
}

/// A category key and the sources scraped for it, in scrape order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub key: String,
    pub sources: Vec<SourceDefinition>,
}

/// The full category → sources catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsConfig {
    pub categories: Vec<CategoryConfig>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NewsConfig {
    pub fn builtin() -> Self {
        Self {
            categories: BUILTIN_CATALOG
                .iter()
                .map(|(key, sources)| CategoryConfig {
                    key: key.to_string(),
                    sources: sources.iter().map(SourceDefinition::from).collect(),
                })
                .collect(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut config: NewsConfig = serde_json::from_str(raw)?;
        for category in &mut config.categories {
            for source in &mut category.sources {
                source.selectors.fill_defaults();
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!(
            "📚 Loaded {} sources in {} categories from {}",
            config.source_count(),
            config.categories.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut keys = HashSet::new();
        for category in &self.categories {
            if category.key.trim().is_empty() {
                return Err(Error::Config("category key must not be empty".to_string()));
            }
            if !keys.insert(category.key.as_str()) {
                return Err(Error::Config(format!("duplicate category: {}", category.key)));
            }

            let mut names = HashSet::new();
            for source in &category.sources {
                if source.name.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "source without a name in category {}",
                        category.key
                    )));
                }
                if !names.insert(source.name.as_str()) {
                    return Err(Error::Config(format!(
                        "duplicate source {} in category {}",
                        source.name, category.key
                    )));
                }
                let url = Url::parse(&source.base_url)
                    .map_err(|e| Error::InvalidUrl(format!("{} ({}): {}", source.base_url, source.name, e)))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(Error::InvalidUrl(format!(
                        "{} ({}): unsupported scheme {}",
                        source.base_url,
                        source.name,
                        url.scheme()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn category(&self, key: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn category_keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.key.as_str())
    }

    pub fn source_count(&self) -> usize {
        self.categories.iter().map(|c| c.sources.len()).sum()
    }
}
