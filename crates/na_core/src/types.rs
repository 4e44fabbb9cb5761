use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of title characters that go into an article id.
const ID_TITLE_CHARS: usize = 30;

/// Display dates are rendered in Singapore time regardless of the host locale.
const DISPLAY_OFFSET_SECS: i32 = 8 * 3600;
const DISPLAY_FORMAT: &str = "%-d %b %Y, %H:%M";

/// An article teaser scraped from a news listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub link: String,
    pub source: String,
    pub image: String,
    pub category: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub display_date: String,
}

impl Article {
    pub fn new(
        source: &str,
        category: &str,
        title: String,
        link: String,
        image: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::make_id(source, &title, timestamp),
            display_date: Self::format_display_date(timestamp),
            title,
            link,
            source: source.to_string(),
            image,
            category: category.to_string(),
            timestamp,
        }
    }

    /// Builds `source-titleprefix-epochmillis` restricted to `[A-Za-z0-9-]`.
    pub fn make_id(source: &str, title: &str, timestamp: DateTime<Utc>) -> String {
        let title_prefix: String = title.chars().take(ID_TITLE_CHARS).collect();
        format!("{}-{}-{}", source, title_prefix, timestamp.timestamp_millis())
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
            .collect()
    }

    pub fn format_display_date(timestamp: DateTime<Utc>) -> String {
        match FixedOffset::east_opt(DISPLAY_OFFSET_SECS) {
            Some(offset) => timestamp.with_timezone(&offset).format(DISPLAY_FORMAT).to_string(),
            None => timestamp.format(DISPLAY_FORMAT).to_string(),
        }
    }

    /// Case-insensitive substring match on title or source. `needle` must already be lowercase.
    pub fn matches_keyword(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.source.to_lowercase().contains(needle)
    }
}

/// Wire format for timestamps: `2024-01-05T00:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Ordered fallback list of CSS selectors. The first one that matches wins,
/// except for container discovery where every list entry contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList(Vec<String>);

impl SelectorList {
    /// Splits a comma-separated selector string into its trimmed, non-empty parts.
    pub fn parse(raw: &str) -> Self {
        raw.split(',').collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SelectorList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl Serialize for SelectorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelectorList {
    Joined(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for SelectorList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSelectorList::deserialize(deserializer)? {
            RawSelectorList::Joined(raw) => Self::parse(&raw),
            RawSelectorList::List(items) => items.into_iter().collect(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelectors {
    #[serde(default)]
    pub container: SelectorList,
    #[serde(default)]
    pub title: SelectorList,
    #[serde(default)]
    pub link: SelectorList,
    #[serde(default)]
    pub image: SelectorList,
    #[serde(default)]
    pub date: SelectorList,
}

impl SourceSelectors {
    pub const DEFAULT_TITLE: &'static str = "h1, h2, h3, .title, .headline";
    pub const DEFAULT_LINK: &'static str = "a[href]";
    pub const DEFAULT_IMAGE: &'static str = "img";
    pub const DEFAULT_DATE: &'static str = "time, .date, .timestamp";

    /// Replaces empty field lists with the generic defaults. Containers are
    /// left alone; an empty container list triggers the scraper's own fallback.
    pub fn fill_defaults(&mut self) {
        for (list, default) in [
            (&mut self.title, Self::DEFAULT_TITLE),
            (&mut self.link, Self::DEFAULT_LINK),
            (&mut self.image, Self::DEFAULT_IMAGE),
            (&mut self.date, Self::DEFAULT_DATE),
        ] {
            if list.is_empty() {
                *list = SelectorList::parse(default);
            }
        }
    }
}

/// A news site and the selectors used to read its front page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDefinition {
    pub name: String,
    #[serde(alias = "url")]
    pub base_url: String,
    #[serde(default)]
    pub selectors: SourceSelectors,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_make_id_sanitizes_and_truncates() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let id = Article::make_id("The Star", "Budget 2024: what's in it for you and your family?", ts);
        assert_eq!(id, "The-Star-Budget-2024--what-s-in-it-for--1704412800000");
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn test_display_date_uses_singapore_time() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 0, 30, 0).unwrap();
        assert_eq!(Article::format_display_date(ts), "5 Jan 2024, 08:30");
    }

    #[test]
    fn test_timestamp_wire_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let article = Article::new(
            "CNA",
            "singapore",
            "Headline".to_string(),
            "https://example.com/a".to_string(),
            "https://example.com/a.jpg".to_string(),
            ts,
        );
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["timestamp"], "2024-01-05T00:00:00.000Z");
        assert_eq!(json["displayDate"], "5 Jan 2024, 08:00");
        assert_eq!(json["category"], "singapore");

        let back: Article = serde_json::from_value(json).unwrap();
        assert_eq!(back, article);
    }

    #[test]
    fn test_matches_keyword() {
        let article = Article::new(
            "Malay Mail",
            "malaysia",
            "Flood warning issued".to_string(),
            "https://example.com".to_string(),
            String::new(),
            Utc::now(),
        );
        assert!(article.matches_keyword("flood"));
        assert!(article.matches_keyword("malay"));
        assert!(!article.matches_keyword("budget"));
    }

    #[test]
    fn test_selector_list_forms_are_equivalent() {
        let joined: SelectorList = serde_json::from_str(r#""h2 a, h3 a , ,.title""#).unwrap();
        let list: SelectorList = serde_json::from_str(r#"["h2 a", " h3 a", "", ".title"]"#).unwrap();
        assert_eq!(joined, list);
        assert_eq!(joined.iter().collect::<Vec<_>>(), vec!["h2 a", "h3 a", ".title"]);
    }

    #[test]
    fn test_fill_defaults_keeps_configured_lists() {
        let mut selectors = SourceSelectors {
            title: SelectorList::parse("h1 a"),
            ..Default::default()
        };
        selectors.fill_defaults();
        assert_eq!(selectors.title.iter().collect::<Vec<_>>(), vec!["h1 a"]);
        assert_eq!(selectors.link.iter().collect::<Vec<_>>(), vec!["a[href]"]);
        assert_eq!(selectors.image.len(), 1);
        assert_eq!(selectors.date.len(), 3);
        assert!(selectors.container.is_empty());
    }
}
