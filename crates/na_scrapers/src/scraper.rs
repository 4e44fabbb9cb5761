use std::sync::Arc;

use chrono::{DateTime, Utc};
use na_core::{Article, SelectorList, SourceDefinition, StatsDelta, StatsSink};
use scraper::Html;

use crate::dom::ElementQuery;
use crate::extract::FieldExtractor;
use crate::fetch::PageFetcher;
use crate::logging::Logger;

/// Containers looked at per source and request.
pub const MAX_CONTAINERS: usize = 25;

/// Used when none of a source's own container selectors match.
pub const GENERIC_CONTAINERS: &str = "article, .card, .story, .post, .item, [class*='card'], [class*='story']";

/// Scrapes one source's listing page into article records.
///
/// Failures never leave this type: a source that cannot be fetched yields
/// no articles and one error count in the stats sink.
#[derive(Clone)]
pub struct SourceScraper {
    fetcher: Arc<dyn PageFetcher>,
    stats: Arc<dyn StatsSink>,
}

impl SourceScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, stats: Arc<dyn StatsSink>) -> Self {
        Self { fetcher, stats }
    }

    pub async fn scrape(&self, source: &SourceDefinition, category: &str) -> Vec<Article> {
        let logger = Logger::new()
            .with_prefix(format!("[{}]", category))
            .with_prefix(format!("[{}]", source.name));

        let body = match self.fetcher.fetch(&source.base_url).await {
            Ok(body) => body,
            Err(e) => {
                logger.error(&format!("❌ Failed to fetch {}: {}", source.base_url, e));
                if let Err(e) = self.stats.accumulate(StatsDelta::error()).await {
                    logger.warn(&format!("Failed to record error: {}", e));
                }
                return Vec::new();
            }
        };

        let articles = extract_listing(&body, source, category, Utc::now());
        logger.info(&format!("📰 {} articles", articles.len()));
        articles
    }
}

/// Parses a listing page and extracts up to [`MAX_CONTAINERS`] articles.
///
/// Kept synchronous: the parsed document is not `Send` and must not live
/// across an await point.
pub fn extract_listing(body: &str, source: &SourceDefinition, category: &str, now: DateTime<Utc>) -> Vec<Article> {
    let document = Html::parse_document(body);
    let containers = discover_containers(document.root_element(), &source.selectors.container, MAX_CONTAINERS);

    let extractor = FieldExtractor::new(source, category, now);
    let mut articles = Vec::new();
    for container in containers {
        if let Some(article) = extractor.extract(container, &articles) {
            articles.push(article);
        }
    }
    articles
}

/// Union of the matches of every selector, in selector order then document
/// order, each element at most once and at most `limit` of them. Falls back
/// to [`GENERIC_CONTAINERS`] when the source's selectors find nothing.
pub fn discover_containers<E: ElementQuery>(root: E, selectors: &SelectorList, limit: usize) -> Vec<E> {
    let found = collect_union(root, selectors.iter(), limit);
    if !found.is_empty() {
        return found;
    }
    let generic = SelectorList::parse(GENERIC_CONTAINERS);
    collect_union(root, generic.iter(), limit)
}

fn collect_union<'s, E: ElementQuery>(root: E, selectors: impl Iterator<Item = &'s str>, limit: usize) -> Vec<E> {
    let mut found: Vec<E> = Vec::new();
    for selector in selectors {
        for element in root.find_all(selector) {
            if found.len() >= limit {
                return found;
            }
            if !found.contains(&element) {
                found.push(element);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use na_core::{placeholder_image, SourceSelectors};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn source(container: &str) -> SourceDefinition {
        let mut selectors = SourceSelectors {
            container: SelectorList::parse(container),
            ..Default::default()
        };
        selectors.fill_defaults();
        SourceDefinition {
            name: "Stub".to_string(),
            base_url: "https://stub.example".to_string(),
            selectors,
        }
    }

    #[test]
    fn test_single_article_listing() {
        let html = r#"<html><body><article><h2><a href="/story/42">Headline</a></h2></article></body></html>"#;
        let articles = extract_listing(html, &source("article"), "singapore", now());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Headline");
        assert_eq!(articles[0].link, "https://stub.example/story/42");
        assert_eq!(articles[0].image, placeholder_image("singapore"));
    }

    #[test]
    fn test_container_union_across_selectors() {
        let html = r#"
            <section class="top"><div class="lead"><h2><a href="/1">Lead story</a></h2></div></section>
            <ul>
                <li class="row"><h3><a href="/2">Row one</a></h3></li>
                <li class="row lead"><h3><a href="/3">Row two</a></h3></li>
            </ul>"#;
        let articles = extract_listing(html, &source(".lead, .row"), "business", now());
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Lead story", "Row two", "Row one"]);
    }

    #[test]
    fn test_generic_fallback_when_nothing_matches() {
        let html = r#"<div class="story"><h3><a href="a.html">Fallback story</a></h3></div>"#;
        let articles = extract_listing(html, &source(".does-not-exist"), "sports", now());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://stub.example/a.html");
    }

    #[test]
    fn test_no_containers_yields_empty() {
        let articles = extract_listing("<p>nothing to see</p>", &source(".x"), "sports", now());
        assert!(articles.is_empty());
        assert!(extract_listing("", &source(""), "sports", now()).is_empty());
    }

    #[test]
    fn test_containers_are_capped() {
        let html: String = (0..40)
            .map(|i| format!(r#"<article><h2><a href="/s/{i}">Story {i}</a></h2></article>"#))
            .collect();
        let articles = extract_listing(&html, &source("article"), "technology", now());
        assert_eq!(articles.len(), MAX_CONTAINERS);
        assert_eq!(articles.last().unwrap().title, "Story 24");
    }

    #[test]
    fn test_duplicate_titles_within_source() {
        let html = r#"
            <article><h2><a href="/a">Budget 2024</a></h2></article>
            <article><h2><a href="/b">Budget 2024</a></h2></article>
            <article><h2><a href="/c">Something else</a></h2></article>"#;
        let articles = extract_listing(html, &source("article"), "business", now());
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].link, "https://stub.example/a");
    }

    #[test]
    fn test_every_record_has_title_and_link() {
        let html = r#"
            <article><h2></h2><a href="/empty-title">x</a></article>
            <article><h2>No link</h2></article>
            <article><h2><a href="/ok">Fine</a></h2></article>"#;
        let articles = extract_listing(html, &source("article"), "health", now());
        assert_eq!(articles.len(), 1);
        assert!(articles.iter().all(|a| !a.title.is_empty() && !a.link.is_empty()));
    }
}
