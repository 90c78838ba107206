pub const DEFAULT_FEED_URL: &str = "https://ctftime.org/event/list/upcoming/rss/";

/// Seconds between two poll cycles.
pub const DEFAULT_CHECK_INTERVAL: i64 = 3600;

pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

pub const DEFAULT_STATE_FILE: &str = "state.json";

/// Thumbnail used when an event has no logo of its own.
pub const DEFAULT_LOGO_URL: &str = "https://ctftime.org/static/images/ctftime-logo-avatar.png";

/// Hours before an event's start from which the "starting soon" notification is due.
pub const PRE_START_LEAD_HOURS: i64 = 24;

/// Date format used by the feed's `start_date` and `finish_date` elements.
pub const FEED_DATE_FORMAT: &str = "%Y%m%dT%H%M%S";
