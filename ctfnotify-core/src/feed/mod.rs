//! Upcoming-events feed parsing.
//!
//! This module turns the RSS document served by the feed into `FeedEvent`s.
//! Fetching the document is left to a `FeedSource`.

mod parse;

use std::future::Future;

use crate::error::NotifyResult;
use crate::event::FeedEvent;

pub use parse::parse_feed;

/// Fetches and parses the feed document at a URL.
pub trait FeedSource {
    fn fetch(&self, url: &str) -> impl Future<Output = NotifyResult<Vec<FeedEvent>>> + Send;
}
