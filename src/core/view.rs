//! View projection - Pure functions turning keyword rows into what a status tab shows.
//!
//! Nothing here touches storage. Relative times are phrased the way the dashboard shows
//! them ("5 minutes ago", "about 2 hours ago", "in 3 days"), and timestamps that arrive
//! as text are parsed leniently: anything unreadable yields `None` rather than an error.

use crate::entities::{KeywordStatus, keyword};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2_520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Display labels derived from a keyword's timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayFields {
    /// How long ago the keyword was created, e.g. "3 days ago"
    pub age_label: Option<String>,
    /// How long ago the last successful generation finished
    pub relative_last_generated: Option<String>,
    /// Long-form date of the last successful generation, e.g. "October 16th, 2026"
    pub last_generated_label: Option<String>,
}

/// A keyword together with its display labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordView {
    /// The keyword row
    pub keyword: keyword::Model,
    /// Labels derived from its timestamps
    pub display: DisplayFields,
}

/// Keeps the keywords with the given status, in their original order.
#[must_use]
pub fn filter_by_status(keywords: &[keyword::Model], status: KeywordStatus) -> Vec<keyword::Model> {
    keywords
        .iter()
        .filter(|keyword| keyword.status == status)
        .cloned()
        .collect()
}

/// Derives display labels for a keyword relative to `now`.
///
/// The last-generated labels are only filled for `completed` keywords. A keyword that
/// is regenerating or was rolled back keeps its old `last_generated_at`, but the
/// dashboard does not show it outside the completed tab.
#[must_use]
pub fn derive_display(keyword: &keyword::Model, now: DateTime<Utc>) -> DisplayFields {
    let last_generated = keyword
        .last_generated_at
        .filter(|_| keyword.status == KeywordStatus::Completed);
    DisplayFields {
        age_label: Some(relative_label(keyword.created_at, now)),
        relative_last_generated: last_generated.map(|at| relative_label(at, now)),
        last_generated_label: last_generated.map(long_date_label),
    }
}

/// Derives display labels from timestamps that arrive as text, e.g. rows from a REST store.
/// Unparsable values produce `None` fields.
#[must_use]
pub fn derive_display_from_raw(
    created_at: &str,
    last_generated_at: Option<&str>,
    now: DateTime<Utc>,
) -> DisplayFields {
    let last_generated = last_generated_at.and_then(parse_timestamp);
    DisplayFields {
        age_label: parse_timestamp(created_at).map(|at| relative_label(at, now)),
        relative_last_generated: last_generated.map(|at| relative_label(at, now)),
        last_generated_label: last_generated.map(long_date_label),
    }
}

/// The filtered tab contents with display labels attached.
#[must_use]
pub fn tab_view(
    keywords: &[keyword::Model],
    status: KeywordStatus,
    now: DateTime<Utc>,
) -> Vec<KeywordView> {
    filter_by_status(keywords, status)
        .into_iter()
        .map(|keyword| {
            let display = derive_display(&keyword, now);
            KeywordView { keyword, display }
        })
        .collect()
}

/// Title shown above a status tab.
#[must_use]
pub const fn tab_title(status: KeywordStatus) -> &'static str {
    match status {
        KeywordStatus::Watching => "Trends to Watch",
        KeywordStatus::Generating => "Currently Generating",
        KeywordStatus::Completed => "Completed Products",
    }
}

/// Placeholder shown when a status tab has no keywords.
#[must_use]
pub const fn empty_tab_message(status: KeywordStatus) -> &'static str {
    match status {
        KeywordStatus::Watching => "No trends tracked yet. Add your first keyword above.",
        KeywordStatus::Generating => "No keywords currently generating.",
        KeywordStatus::Completed => "No completed generations yet.",
    }
}

/// Parses an RFC 3339 timestamp, or a naive `YYYY-MM-DD HH:MM:SS[.fff]` one taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Distance between `at` and `now` in words, with an "ago" or "in" suffix.
#[must_use]
pub fn relative_label(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();
    let distance = distance_in_words(seconds.abs());
    if seconds < 0 {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

/// Long-form date, e.g. "October 16th, 2026".
#[must_use]
pub fn long_date_label(at: DateTime<Utc>) -> String {
    let day = at.day();
    format!(
        "{} {}{}, {}",
        at.format("%B"),
        day,
        ordinal_suffix(day),
        at.year()
    )
}

fn distance_in_words(seconds: i64) -> String {
    // Round to the nearest minute
    let minutes = (seconds + 30) / 60;

    if minutes < 1 {
        return "less than a minute".to_string();
    }
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = rounded_div(minutes, MINUTES_IN_HOUR);
        return format!("about {}", plural(hours, "hour"));
    }
    if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        return plural(rounded_div(minutes, MINUTES_IN_DAY), "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        return format!(
            "about {}",
            plural(rounded_div(minutes, MINUTES_IN_MONTH), "month")
        );
    }

    let months = rounded_div(minutes, MINUTES_IN_MONTH);
    if months < 12 {
        return plural(months, "month");
    }
    let years = months / 12;
    match months % 12 {
        0..3 => format!("about {}", plural(years, "year")),
        3..9 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

const fn rounded_div(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

const fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{Duration, TimeZone};

    fn keyword_at(id: i64, status: KeywordStatus, created_at: DateTime<Utc>) -> keyword::Model {
        keyword::Model {
            id,
            keyword: format!("keyword {id}"),
            search_count: 0,
            last_searched_at: None,
            status,
            last_generated_at: None,
            created_at,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_filter_by_status_preserves_order() {
        let now = fixed_now();
        let keywords = vec![
            keyword_at(3, KeywordStatus::Completed, now),
            keyword_at(2, KeywordStatus::Watching, now),
            keyword_at(1, KeywordStatus::Completed, now),
        ];

        let completed = filter_by_status(&keywords, KeywordStatus::Completed);
        let ids: Vec<i64> = completed.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![3, 1]);

        assert!(filter_by_status(&keywords, KeywordStatus::Generating).is_empty());
    }

    #[test]
    fn test_filter_by_status_is_repeatable() {
        let now = fixed_now();
        let keywords = vec![
            keyword_at(2, KeywordStatus::Watching, now),
            keyword_at(1, KeywordStatus::Watching, now),
        ];
        assert_eq!(
            filter_by_status(&keywords, KeywordStatus::Watching),
            filter_by_status(&keywords, KeywordStatus::Watching)
        );
    }

    #[test]
    fn test_distance_in_words() {
        let now = fixed_now();
        let cases = [
            (Duration::seconds(10), "less than a minute ago"),
            (Duration::seconds(80), "1 minute ago"),
            (Duration::minutes(5), "5 minutes ago"),
            (Duration::minutes(50), "about 1 hour ago"),
            (Duration::hours(3), "about 3 hours ago"),
            (Duration::hours(30), "1 day ago"),
            (Duration::days(3), "3 days ago"),
            (Duration::days(35), "about 1 month ago"),
            (Duration::days(150), "5 months ago"),
            (Duration::days(370), "about 1 year ago"),
            (Duration::days(550), "over 1 year ago"),
            (Duration::days(700), "almost 2 years ago"),
        ];
        for (offset, expected) in cases {
            assert_eq!(relative_label(now - offset, now), expected, "offset {offset}");
        }
    }

    #[test]
    fn test_future_timestamps_use_in() {
        let now = fixed_now();
        assert_eq!(relative_label(now + Duration::days(3), now), "in 3 days");
    }

    #[test]
    fn test_long_date_label() {
        assert_eq!(long_date_label(fixed_now()), "October 16th, 2026");
        let first = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(long_date_label(first), "March 1st, 2026");
        let twelfth = Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap();
        assert_eq!(long_date_label(twelfth), "March 12th, 2026");
        let twenty_second = Utc.with_ymd_and_hms(2026, 3, 22, 0, 0, 0).unwrap();
        assert_eq!(long_date_label(twenty_second), "March 22nd, 2026");
    }

    #[test]
    fn test_derive_display() {
        let now = fixed_now();
        let mut keyword = keyword_at(1, KeywordStatus::Completed, now - Duration::days(2));
        keyword.last_generated_at = Some(now - Duration::minutes(5));

        let display = derive_display(&keyword, now);
        assert_eq!(display.age_label.as_deref(), Some("2 days ago"));
        assert_eq!(
            display.relative_last_generated.as_deref(),
            Some("5 minutes ago")
        );
        assert_eq!(
            display.last_generated_label.as_deref(),
            Some("October 16th, 2026")
        );
    }

    #[test]
    fn test_derive_display_without_generation() {
        let now = fixed_now();
        let keyword = keyword_at(1, KeywordStatus::Watching, now);
        let display = derive_display(&keyword, now);
        assert_eq!(display.age_label.as_deref(), Some("less than a minute ago"));
        assert!(display.relative_last_generated.is_none());
        assert!(display.last_generated_label.is_none());
    }

    #[test]
    fn test_derive_display_hides_generation_outside_completed() {
        let now = fixed_now();
        for status in [KeywordStatus::Generating, KeywordStatus::Watching] {
            // Regenerating keywords keep the previous timestamp in storage
            let mut keyword = keyword_at(1, status, now - Duration::days(2));
            keyword.last_generated_at = Some(now - Duration::hours(3));

            let display = derive_display(&keyword, now);
            assert_eq!(display.age_label.as_deref(), Some("2 days ago"));
            assert!(display.relative_last_generated.is_none());
            assert!(display.last_generated_label.is_none());
        }
    }

    #[test]
    fn test_derive_display_from_raw_fails_soft() {
        let now = fixed_now();

        let display = derive_display_from_raw("yesterday-ish", Some("garbage"), now);
        assert_eq!(display, DisplayFields::default());

        let display = derive_display_from_raw(
            "2026-10-16T11:00:00+00:00",
            Some("2026-10-16 11:55:00"),
            now,
        );
        assert_eq!(display.age_label.as_deref(), Some("about 1 hour ago"));
        assert_eq!(
            display.relative_last_generated.as_deref(),
            Some("5 minutes ago")
        );
    }

    #[test]
    fn test_tab_view_and_labels() {
        let now = fixed_now();
        let keywords = vec![
            keyword_at(2, KeywordStatus::Generating, now),
            keyword_at(1, KeywordStatus::Watching, now),
        ];
        let view = tab_view(&keywords, KeywordStatus::Generating, now);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].keyword.id, 2);
        assert_eq!(tab_title(KeywordStatus::Generating), "Currently Generating");
        assert_eq!(
            empty_tab_message(KeywordStatus::Completed),
            "No completed generations yet."
        );
    }
}
