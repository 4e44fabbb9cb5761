//! Free-form publish date parsing.
//!
//! Listing pages expose dates in every imaginable shape: ISO timestamps in
//! `datetime` attributes, "Jan 5, 2024" bylines, "5th January 2024", US
//! slashed dates. Each strategy below is tried in order and the first result
//! that falls inside the plausibility window wins. A candidate that parses
//! but lies in the future or more than a year back counts as a failure.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

/// Oldest accepted publish date, in days before evaluation time.
pub const PLAUSIBLE_DAYS: i64 = 365;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z", "%Y-%m-%d %H:%M:%S%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%d %B %Y %H:%M",
    "%A, %B %d, %Y %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%A, %d %B %Y",
    "%A %d %B %Y",
];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref ORDINAL: Regex = Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap();
    static ref MONTH_DAY_YEAR: Regex =
        Regex::new(r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})\b").unwrap();
    static ref DAY_MONTH_YEAR: Regex =
        Regex::new(r"(?i)\b(\d{1,2})\s+([a-z]{3,9})\.?,?\s+(\d{4})\b").unwrap();
    static ref ISO_DAY: Regex = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})").unwrap();
    static ref US_SLASHED: Regex = Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap();
}

type Strategy = fn(&str) -> Option<DateTime<Utc>>;

const STRATEGIES: &[Strategy] = &[
    parse_direct,
    parse_without_ordinals,
    parse_month_day_year,
    parse_day_month_year,
    parse_iso_day,
    parse_us_slashed,
];

/// Parses `text` against the current time.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    parse_date_at(text, Utc::now())
}

/// Parses `text`, accepting only results within a year before `now`.
pub fn parse_date_at(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return None;
    }

    STRATEGIES
        .iter()
        .filter_map(|strategy| strategy(&text))
        .find(|candidate| is_plausible(*candidate, now))
}

pub fn is_plausible(candidate: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    candidate <= now && candidate >= now - Duration::days(PLAUSIBLE_DAYS)
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn parse_direct(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn parse_without_ordinals(text: &str) -> Option<DateTime<Utc>> {
    match ORDINAL.replace_all(text, "$1") {
        Cow::Borrowed(_) => None,
        Cow::Owned(stripped) => parse_direct(&stripped),
    }
}

fn parse_month_day_year(text: &str) -> Option<DateTime<Utc>> {
    MONTH_DAY_YEAR.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        midnight_utc(caps[3].parse().ok()?, month, caps[2].parse().ok()?)
    })
}

fn parse_day_month_year(text: &str) -> Option<DateTime<Utc>> {
    DAY_MONTH_YEAR.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[2])?;
        midnight_utc(caps[3].parse().ok()?, month, caps[1].parse().ok()?)
    })
}

fn parse_iso_day(text: &str) -> Option<DateTime<Utc>> {
    ISO_DAY.captures_iter(text).find_map(|caps| {
        midnight_utc(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    })
}

fn parse_us_slashed(text: &str) -> Option<DateTime<Utc>> {
    US_SLASHED.captures_iter(text).find_map(|caps| {
        midnight_utc(caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
    })
}

/// Month number (1-12) for a full or abbreviated English month name.
fn month_number(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    if name.len() < 3 {
        return None;
    }
    let name = if name == "sept" { "sep" } else { name.as_str() };
    MONTHS
        .iter()
        .position(|month| month.starts_with(name))
        .map(|index| index as u32 + 1)
}

fn midnight_utc(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ymd(dt: DateTime<Utc>) -> (i32, u32, u32) {
        (dt.year(), dt.month(), dt.day())
    }

    #[test]
    fn test_iso_timestamps() {
        let parsed = parse_date_at("2024-03-05T08:15:00+08:00", now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 0, 15, 0).unwrap());

        let parsed = parse_date_at("2024-03-05T08:15:00.000Z", now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 8, 15, 0).unwrap());

        let parsed = parse_date_at("Tue, 05 Mar 2024 10:00:00 +0000", now()).unwrap();
        assert_eq!(ymd(parsed), (2024, 3, 5));
    }

    #[test]
    fn test_textual_formats() {
        assert_eq!(ymd(parse_date_at("Mar 5, 2024", now()).unwrap()), (2024, 3, 5));
        assert_eq!(ymd(parse_date_at("5 March 2024", now()).unwrap()), (2024, 3, 5));
        assert_eq!(ymd(parse_date_at("Tuesday, March 5, 2024", now()).unwrap()), (2024, 3, 5));
        assert_eq!(ymd(parse_date_at("  Mar\n 5,\t2024 ", now()).unwrap()), (2024, 3, 5));
    }

    #[test]
    fn test_ordinal_suffixes_are_stripped() {
        assert_eq!(ymd(parse_date_at("March 5th, 2024", now()).unwrap()), (2024, 3, 5));
        assert_eq!(ymd(parse_date_at("1st June 2024", now()).unwrap()), (2024, 6, 1));
        assert_eq!(ymd(parse_date_at("May 22nd 2024", now()).unwrap()), (2024, 5, 22));
    }

    #[test]
    fn test_embedded_patterns() {
        assert_eq!(ymd(parse_date_at("Updated: Jan 5, 2024 at 4pm", now()).unwrap()), (2024, 1, 5));
        assert_eq!(ymd(parse_date_at("Published 5 Sept 2023 | 3 min read", now()).unwrap()), (2023, 9, 5));
        assert_eq!(ymd(parse_date_at("posted on 2024-02-29 by staff", now()).unwrap()), (2024, 2, 29));
        assert_eq!(ymd(parse_date_at("Published: 03/04/2024", now()).unwrap()), (2024, 3, 4));
    }

    #[test]
    fn test_iso_days_within_window_keep_their_components() {
        for days_back in 0..=363 {
            let expected = now() - Duration::days(days_back);
            let text = expected.format("%Y-%m-%d").to_string();
            let parsed = parse_date_at(&text, now()).unwrap_or_else(|| panic!("failed on {}", text));
            assert_eq!(ymd(parsed), ymd(expected), "{}", text);
        }
    }

    #[test]
    fn test_dates_outside_window_are_rejected() {
        for days_back in [366, 400, 1000] {
            let text = (now() - Duration::days(days_back)).format("%Y-%m-%d").to_string();
            assert_eq!(parse_date_at(&text, now()), None, "{}", text);
        }
        for days_ahead in [1, 2, 30] {
            let text = (now() + Duration::days(days_ahead)).format("%Y-%m-%d").to_string();
            assert_eq!(parse_date_at(&text, now()), None, "{}", text);
        }
        assert_eq!(parse_date_at("Jan 1, 2099", now()), None);
        assert_eq!(parse_date_at("12/25/2019", now()), None);
    }

    #[test]
    fn test_later_strategies_run_after_an_implausible_candidate() {
        // The full timestamp is in the future, the bare day is not.
        assert_eq!(
            parse_date_at("2024-06-15T12:30:00Z", now()),
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable_input() {
        assert_eq!(parse_date_at("", now()), None);
        assert_eq!(parse_date_at("   ", now()), None);
        assert_eq!(parse_date_at("5 hours ago", now()), None);
        assert_eq!(parse_date_at("Foo 5, 2024", now()), None);
        assert_eq!(parse_date_at("2024-13-45", now()), None);
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("Jan"), Some(1));
        assert_eq!(month_number("SEPT"), Some(9));
        assert_eq!(month_number("december"), Some(12));
        assert_eq!(month_number("Ma"), None);
        assert_eq!(month_number("Mayday"), None);
    }
}
