use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::date::collapse_whitespace;

/// Minimal read-only view of a parsed HTML element, all the extraction code
/// needs from a parser.
pub trait ElementQuery: Copy + PartialEq {
    /// Descendants matching `selector`, in document order. An invalid
    /// selector matches nothing.
    fn find_all(&self, selector: &str) -> Vec<Self>;

    fn find_first(&self, selector: &str) -> Option<Self> {
        self.find_all(selector).into_iter().next()
    }

    /// Text content, trimmed with inner whitespace collapsed.
    fn inner_text(&self) -> String;

    /// Attribute value, `None` when missing or blank.
    fn attribute(&self, name: &str) -> Option<String>;
}

impl ElementQuery for ElementRef<'_> {
    fn find_all(&self, selector: &str) -> Vec<Self> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select(&parsed).collect(),
            Err(e) => {
                debug!("Skipping invalid selector {:?}: {:?}", selector, e);
                Vec::new()
            }
        }
    }

    fn inner_text(&self) -> String {
        collapse_whitespace(&self.text().collect::<String>())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value()
            .attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
