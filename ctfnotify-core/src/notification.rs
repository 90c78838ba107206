//! Deciding which notifications are due for an event.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::constants::PRE_START_LEAD_HOURS;
use crate::event::FeedEvent;
use crate::state::NotifyState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// The event showed up in the feed for the first time
    FirstSeen,
    /// The event starts within the next 24 hours
    StartingSoon,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::FirstSeen => write!(f, "first-seen"),
            NotificationKind::StartingSoon => write!(f, "starting-soon"),
        }
    }
}

/// The instant from which the "starting soon" notification is due.
pub fn pre_start_threshold(start: DateTime<Utc>) -> DateTime<Utc> {
    start - TimeDelta::hours(PRE_START_LEAD_HOURS)
}

/// Notifications due for `event` at `now`, in sending order.
///
/// Events without an identifier never have anything due. Both kinds can be
/// due at once, e.g. for an event first seen less than a day before it starts.
pub fn due_notifications(
    event: &FeedEvent,
    state: &NotifyState,
    now: DateTime<Utc>,
) -> Vec<NotificationKind> {
    let Some(id) = event.id.as_deref() else {
        return Vec::new();
    };

    let mut due = Vec::with_capacity(2);

    if !state.contains(NotificationKind::FirstSeen, id) {
        due.push(NotificationKind::FirstSeen);
    }

    if let Some(start) = event.start
        && now >= pre_start_threshold(start)
        && !state.contains(NotificationKind::StartingSoon, id)
    {
        due.push(NotificationKind::StartingSoon);
    }

    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn event(id: Option<&str>, start: Option<&str>) -> FeedEvent {
        let mut attributes = HashMap::new();
        if let Some(start) = start {
            attributes.insert("start_date".to_string(), start.to_string());
        }
        FeedEvent::from_attributes(id.map(String::from), Some("Test CTF".into()), None, attributes)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn unseen_event_is_first_seen() {
        let e = event(Some("abc123"), Some("20300101T120000"));
        let due = due_notifications(&e, &NotifyState::default(), at(2029, 12, 30, 0, 0));
        assert_eq!(due, vec![NotificationKind::FirstSeen]);
    }

    #[test]
    fn nothing_due_without_identifier() {
        let e = event(None, Some("20300101T120000"));
        let due = due_notifications(&e, &NotifyState::default(), at(2030, 1, 1, 11, 0));
        assert!(due.is_empty());
    }

    #[test]
    fn pre_start_due_exactly_at_threshold() {
        let e = event(Some("abc123"), Some("20300101T120000"));
        let mut state = NotifyState::default();
        state.record(NotificationKind::FirstSeen, "abc123");

        assert!(due_notifications(&e, &state, at(2029, 12, 31, 11, 59)).is_empty());
        assert_eq!(
            due_notifications(&e, &state, at(2029, 12, 31, 12, 0)),
            vec![NotificationKind::StartingSoon]
        );
    }

    #[test]
    fn both_due_for_late_discovery() {
        let e = event(Some("abc123"), Some("20300101T120000"));
        let due = due_notifications(&e, &NotifyState::default(), at(2030, 1, 1, 0, 0));
        assert_eq!(
            due,
            vec![NotificationKind::FirstSeen, NotificationKind::StartingSoon]
        );
    }

    #[test]
    fn pre_start_still_due_after_start_if_never_sent() {
        let e = event(Some("abc123"), Some("20300101T120000"));
        let mut state = NotifyState::default();
        state.record(NotificationKind::FirstSeen, "abc123");
        assert_eq!(
            due_notifications(&e, &state, at(2030, 1, 3, 0, 0)),
            vec![NotificationKind::StartingSoon]
        );
    }

    #[test]
    fn no_pre_start_without_parseable_start() {
        let e = event(Some("abc123"), Some("garbage"));
        let mut state = NotifyState::default();
        state.record(NotificationKind::FirstSeen, "abc123");
        assert!(due_notifications(&e, &state, at(2030, 1, 1, 0, 0)).is_empty());
    }

    #[test]
    fn nothing_due_once_both_recorded() {
        let e = event(Some("abc123"), Some("20300101T120000"));
        let mut state = NotifyState::default();
        state.record(NotificationKind::FirstSeen, "abc123");
        state.record(NotificationKind::StartingSoon, "abc123");
        assert!(due_notifications(&e, &state, at(2030, 1, 1, 0, 0)).is_empty());
    }
}
