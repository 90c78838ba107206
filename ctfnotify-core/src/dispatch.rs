//! Running a feed snapshot through classification, rendering and delivery.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::embed::{EmbedFormatter, WebhookPayload};
use crate::error::NotifyResult;
use crate::event::FeedEvent;
use crate::notification::{NotificationKind, due_notifications};
use crate::state::NotifyState;

/// Delivers rendered payloads to the chat destination.
pub trait Notifier {
    fn notify(&self, payload: &WebhookPayload) -> impl Future<Output = NotifyResult<()>> + Send;
}

/// What happened during one pass over the feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub events: usize,
    pub first_seen: usize,
    pub starting_soon: usize,
    pub failed: usize,
}

impl CycleStats {
    pub fn sent(&self) -> usize {
        self.first_seen + self.starting_soon
    }
}

/// Send every notification that is due for `events` at `now`.
///
/// State is consulted as the feed is walked, so an identifier that appears
/// twice in one snapshot is only notified once. A failed delivery is logged
/// and still recorded: nothing is ever sent twice, at the cost of a
/// notification that may never arrive.
pub async fn dispatch<N: Notifier>(
    events: &[FeedEvent],
    state: &mut NotifyState,
    formatter: &EmbedFormatter,
    notifier: &N,
    now: DateTime<Utc>,
) -> CycleStats {
    let mut stats = CycleStats {
        events: events.len(),
        ..CycleStats::default()
    };

    for event in events {
        let Some(id) = event.id.as_deref() else {
            tracing::debug!(title = %event.title, "Skipping event without identifier");
            continue;
        };

        for kind in due_notifications(event, state, now) {
            let payload = WebhookPayload::from(formatter.render(event, kind, now));

            match notifier.notify(&payload).await {
                Ok(()) => {
                    tracing::info!(id, %kind, title = %event.title, "Notification sent");
                    match kind {
                        NotificationKind::FirstSeen => stats.first_seen += 1,
                        NotificationKind::StartingSoon => stats.starting_soon += 1,
                    }
                }
                Err(e) => {
                    tracing::error!(id, %kind, error = %e, "Failed to send notification");
                    stats.failed += 1;
                }
            }

            state.record(kind, id);
        }
    }

    stats
}
