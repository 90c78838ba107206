//! Feed event records.
//!
//! A `FeedEvent` is one `<item>` of the upcoming-events feed. The well-known
//! fields are lifted out; everything else the item carries stays in a plain
//! attribute map and is read through the typed accessors below.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::constants::FEED_DATE_FORMAT;

/// A single event from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    /// Dedup key. `None` means the event can never be notified.
    pub id: Option<String>,
    pub title: String,
    pub link: String,
    pub start: Option<DateTime<Utc>>,
    pub finish: Option<DateTime<Utc>>,
    /// Remaining child elements by local tag name (`format_text`, `onsite`, ...)
    pub attributes: HashMap<String, String>,
}

/// An organizer entry from the JSON-encoded `organizers` element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Organizer {
    /// `None` when the key is absent; `Some(Value::Null)` for an explicit null
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl FeedEvent {
    /// Build an event from the raw child-element map of a feed item.
    ///
    /// `start_date` and `finish_date` are parsed eagerly; values that don't
    /// match the feed's date format are dropped.
    pub fn from_attributes(
        id: Option<String>,
        title: Option<String>,
        link: Option<String>,
        attributes: HashMap<String, String>,
    ) -> Self {
        let start = attributes.get("start_date").and_then(|s| parse_feed_date(s));
        let finish = attributes.get("finish_date").and_then(|s| parse_feed_date(s));

        FeedEvent {
            id: id.filter(|s| !s.is_empty()),
            title: title.unwrap_or_else(|| "No Title".to_string()),
            link: link.unwrap_or_default(),
            start,
            finish,
            attributes,
        }
    }

    /// Raw attribute value, with blank values treated as missing.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn format_text(&self) -> Option<&str> {
        self.attribute("format_text")
    }

    /// Whether the event takes place on-site. Anything but a case-insensitive
    /// "true" (including a missing flag) counts as online.
    pub fn is_onsite(&self) -> bool {
        self.attribute("onsite")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn location(&self) -> Option<&str> {
        self.attribute("location")
    }

    /// Organizer names.
    ///
    /// Entries without a `name` key are skipped. An unparsable `organizers`
    /// element, or any entry whose name is not a string, yields no names.
    pub fn organizer_names(&self) -> Vec<String> {
        let Some(raw) = self.attribute("organizers") else {
            return Vec::new();
        };
        let Ok(organizers) = serde_json::from_str::<Vec<Organizer>>(raw) else {
            return Vec::new();
        };

        let mut names = Vec::with_capacity(organizers.len());
        for organizer in organizers {
            match organizer.name {
                None => {}
                Some(Value::String(name)) => names.push(name),
                Some(_) => return Vec::new(),
            }
        }
        names
    }

    /// The CTF's own website (not the feed link).
    pub fn official_url(&self) -> Option<&str> {
        self.attribute("url")
    }

    /// Logo path as found in the feed, usually relative to the feed's origin.
    pub fn logo_path(&self) -> Option<&str> {
        self.attribute("logo_url")
    }
}

/// Parse a feed timestamp (`YYYYMMDDTHHMMSS`, always UTC).
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), FEED_DATE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event_with(attrs: &[(&str, &str)]) -> FeedEvent {
        let attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FeedEvent::from_attributes(Some("abc123".into()), Some("Test CTF".into()), None, attributes)
    }

    #[test]
    fn parses_compact_utc_dates() {
        assert_eq!(
            parse_feed_date("20300101T120000"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(parse_feed_date(""), None);
        assert_eq!(parse_feed_date("2030-01-01T12:00:00"), None);
        assert_eq!(parse_feed_date("20301301T120000"), None);
    }

    #[test]
    fn bad_start_date_means_no_start() {
        let event = event_with(&[("start_date", "tomorrow"), ("finish_date", "20300102T120000")]);
        assert_eq!(event.start, None);
        assert!(event.finish.is_some());
    }

    #[test]
    fn blank_id_is_treated_as_missing() {
        let event = FeedEvent::from_attributes(Some(String::new()), None, None, HashMap::new());
        assert_eq!(event.id, None);
        assert_eq!(event.title, "No Title");
        assert_eq!(event.link, "");
    }

    #[test]
    fn onsite_flag_is_case_insensitive() {
        assert!(event_with(&[("onsite", "TRUE")]).is_onsite());
        assert!(event_with(&[("onsite", "True")]).is_onsite());
        assert!(!event_with(&[("onsite", "False")]).is_onsite());
        assert!(!event_with(&[]).is_onsite());
    }

    #[test]
    fn organizer_names_from_json() {
        let event = event_with(&[(
            "organizers",
            r#"[{"id": 1, "name": "Team A"}, {"id": 2}, {"id": 3, "name": "Team B"}]"#,
        )]);
        assert_eq!(event.organizer_names(), vec!["Team A", "Team B"]);
    }

    #[test]
    fn non_string_organizer_name_drops_all_names() {
        let event = event_with(&[(
            "organizers",
            r#"[{"id": 1, "name": "Team A"}, {"id": 2, "name": null}]"#,
        )]);
        assert!(event.organizer_names().is_empty());

        let event = event_with(&[("organizers", r#"[{"name": "Team A"}, {"name": 7}]"#)]);
        assert!(event.organizer_names().is_empty());
    }

    #[test]
    fn organizer_names_tolerate_garbage() {
        assert!(event_with(&[("organizers", "not json")]).organizer_names().is_empty());
        assert!(event_with(&[("organizers", "{}")]).organizer_names().is_empty());
        assert!(event_with(&[]).organizer_names().is_empty());
    }
}
