use chrono::{DateTime, Utc};
use na_core::{placeholder_image, Article, SourceDefinition};
use tracing::debug;

use crate::date::parse_date_at;
use crate::dom::ElementQuery;
use crate::urls::resolve;

/// Generic time markers checked after the source's own date selectors.
const TIME_MARKERS: &str = "time, [datetime]";

/// Attributes holding a machine-readable date, checked before element text.
const DATE_ATTRIBUTES: &[&str] = &["datetime", "content", "data-date"];

/// Image source attributes, plain `src` first then lazy-load variants.
const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

/// Reads one article record out of a container element.
pub struct FieldExtractor<'a> {
    source: &'a SourceDefinition,
    category: &'a str,
    now: DateTime<Utc>,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(source: &'a SourceDefinition, category: &'a str, now: DateTime<Utc>) -> Self {
        Self { source, category, now }
    }

    /// Builds a record from `container`, or `None` when it has no usable
    /// title/link or duplicates a title already in `accepted`.
    pub fn extract<E: ElementQuery>(&self, container: E, accepted: &[Article]) -> Option<Article> {
        let Some((title_element, title)) = self.find_title(container) else {
            debug!("[{}] container without title, skipping", self.source.name);
            return None;
        };
        let Some(href) = self.find_link(container, title_element) else {
            debug!("[{}] no link for {:?}, skipping", self.source.name, title);
            return None;
        };

        if accepted
            .iter()
            .any(|a| a.title == title && a.source == self.source.name)
        {
            debug!("[{}] duplicate title {:?}, skipping", self.source.name, title);
            return None;
        }

        let link = resolve(&href, &self.source.base_url);
        let timestamp = self.find_date(container).unwrap_or(self.now);
        let image = self
            .find_image(container)
            .unwrap_or_else(|| placeholder_image(self.category).to_string());

        Some(Article::new(
            &self.source.name,
            self.category,
            title,
            link,
            image,
            timestamp,
        ))
    }

    fn find_title<E: ElementQuery>(&self, container: E) -> Option<(E, String)> {
        self.source.selectors.title.iter().find_map(|selector| {
            container.find_all(selector).into_iter().find_map(|element| {
                let text = element.inner_text();
                (!text.is_empty()).then_some((element, text))
            })
        })
    }

    fn find_link<E: ElementQuery>(&self, container: E, title_element: E) -> Option<String> {
        title_element.attribute("href").or_else(|| {
            self.source.selectors.link.iter().find_map(|selector| {
                container
                    .find_all(selector)
                    .into_iter()
                    .find_map(|element| element.attribute("href"))
            })
        })
    }

    fn find_date<E: ElementQuery>(&self, container: E) -> Option<DateTime<Utc>> {
        let candidates = self
            .source
            .selectors
            .date
            .iter()
            .flat_map(|selector| container.find_all(selector))
            .chain(container.find_all(TIME_MARKERS));

        for candidate in candidates {
            let values = DATE_ATTRIBUTES
                .iter()
                .filter_map(|name| candidate.attribute(name))
                .chain(std::iter::once(candidate.inner_text()));
            for value in values {
                if let Some(parsed) = parse_date_at(&value, self.now) {
                    return Some(parsed);
                }
            }
        }
        None
    }

    fn find_image<E: ElementQuery>(&self, container: E) -> Option<String> {
        let from_selectors = self.source.selectors.image.iter().find_map(|selector| {
            container.find_first(selector).and_then(image_source)
        });

        from_selectors
            .or_else(|| container.find_all("img").into_iter().find_map(image_source))
            .map(|src| resolve(&src, &self.source.base_url))
    }
}

fn image_source<E: ElementQuery>(element: E) -> Option<String> {
    IMAGE_ATTRIBUTES.iter().find_map(|name| element.attribute(name))
}
