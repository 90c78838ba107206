//! Core types for ctfnotify.
//!
//! This crate holds everything that does not touch the network:
//! - `settings` for validated runtime configuration
//! - `feed` and `event` for turning the RSS document into `FeedEvent`s,
//!   and the `FeedSource` seam for fetching it
//! - `state` for the persisted sets of already-notified identifiers
//! - `notification` and `embed` for deciding what is due and rendering it
//! - `dispatch` for running one feed snapshot through a `Notifier`

pub mod constants;
pub mod dispatch;
pub mod embed;
pub mod error;
pub mod event;
pub mod feed;
pub mod notification;
pub mod settings;
pub mod state;

pub use dispatch::{CycleStats, Notifier, dispatch};
pub use embed::{Embed, EmbedField, EmbedFormatter, WebhookPayload};
pub use error::{NotifyError, NotifyResult};
pub use event::FeedEvent;
pub use feed::FeedSource;
pub use notification::NotificationKind;
pub use settings::Settings;
pub use state::NotifyState;
