//! Discord embed rendering for feed events.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use url::Url;

use crate::constants::DEFAULT_LOGO_URL;
use crate::event::FeedEvent;
use crate::notification::NotificationKind;

const NEW_EVENT_COLOR: u32 = 0x00FF00;
const STARTING_SOON_COLOR: u32 = 0xFFA500;

/// Placeholder for fields with nothing to show.
const NOT_AVAILABLE: &str = "N/A";
const ONLINE: &str = "On-line";
/// Zero-width space; Discord rejects empty field names and values.
const BLANK: &str = "\u{200b}";

/// Body of a webhook execution request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

impl From<Embed> for WebhookPayload {
    fn from(embed: Embed) -> Self {
        WebhookPayload {
            embeds: vec![embed],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<EmbedField>,
    pub thumbnail: Thumbnail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        EmbedField {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Renders feed events into embeds for a fixed display timezone and feed origin.
#[derive(Debug, Clone)]
pub struct EmbedFormatter {
    timezone: Tz,
    /// Root of the feed's site, used to resolve relative logo paths
    origin: Option<Url>,
}

impl EmbedFormatter {
    /// An unknown timezone name falls back to UTC rather than failing.
    pub fn new(timezone: &str, feed_url: &str) -> Self {
        let timezone = timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(timezone, "Unknown timezone, displaying times in UTC");
            Tz::UTC
        });
        let origin = Url::parse(feed_url).and_then(|u| u.join("/")).ok();

        EmbedFormatter { timezone, origin }
    }

    /// `YYYY-MM-DD HH:MM <zone abbreviation>` in the display timezone.
    pub fn format_time(&self, dt: DateTime<Utc>) -> String {
        dt.with_timezone(&self.timezone)
            .format("%Y-%m-%d %H:%M %Z")
            .to_string()
    }

    /// Absolute thumbnail URL for an event's logo path.
    pub fn logo_url(&self, logo_path: Option<&str>) -> String {
        let Some(path) = logo_path else {
            return DEFAULT_LOGO_URL.to_string();
        };

        match &self.origin {
            Some(origin) => origin
                .join(path)
                .map(String::from)
                .unwrap_or_else(|_| DEFAULT_LOGO_URL.to_string()),
            None => Url::parse(path)
                .map(String::from)
                .unwrap_or_else(|_| DEFAULT_LOGO_URL.to_string()),
        }
    }

    pub fn render(&self, event: &FeedEvent, kind: NotificationKind, now: DateTime<Utc>) -> Embed {
        let (title, color) = match kind {
            NotificationKind::FirstSeen => {
                (format!("🔥 New CTF Added: {}", event.title), NEW_EVENT_COLOR)
            }
            NotificationKind::StartingSoon => {
                (format!("⏰ CTF starts in 24h: {}", event.title), STARTING_SOON_COLOR)
            }
        };

        // Times are only shown for events with a known start
        let start = event.start.map(|dt| self.format_time(dt));
        let finish = start
            .as_ref()
            .and(event.finish)
            .map(|dt| self.format_time(dt));

        let mut fields = Vec::with_capacity(7);
        if let Some(start) = &start {
            fields.push(EmbedField::new("Start Time", start, true));
        }
        if let Some(finish) = &finish {
            fields.push(EmbedField::new("End Time", finish, true));
        }
        if start.is_some() && finish.is_some() {
            fields.push(EmbedField::new(BLANK, BLANK, true));
        }

        let location = if event.is_onsite() {
            event.location().unwrap_or(NOT_AVAILABLE)
        } else {
            ONLINE
        };

        let organizers = event.organizer_names();
        let organizers = if organizers.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            organizers.join(", ")
        };

        fields.push(EmbedField::new(
            "Format",
            event.format_text().unwrap_or(NOT_AVAILABLE),
            true,
        ));
        fields.push(EmbedField::new("Location", location, true));
        fields.push(EmbedField::new("Organizers", organizers, true));
        fields.push(EmbedField::new(
            "Official URL",
            event.official_url().unwrap_or(NOT_AVAILABLE),
            false,
        ));

        Embed {
            title,
            url: event.link.clone(),
            color,
            timestamp: now,
            fields,
            thumbnail: Thumbnail {
                url: self.logo_url(event.logo_path()),
            },
        }
    }
}
