//! The poll loop: fetch, notify, persist, sleep.

use anyhow::{Context, Result};
use chrono::Utc;
use ctfnotify_core::{
    CycleStats, EmbedFormatter, FeedSource, Notifier, NotifyState, Settings, dispatch,
};
use tracing::{error, info};

use crate::client::{Client, DiscordWebhook};

pub struct Poller<'a, F, N> {
    settings: &'a Settings,
    source: F,
    notifier: N,
    formatter: EmbedFormatter,
    /// Kept in memory across cycles; written out after each successful one
    state: NotifyState,
}

impl<'a> Poller<'a, Client, DiscordWebhook> {
    /// A poller that fetches over HTTP and posts to the configured webhook.
    pub fn new(settings: &'a Settings, state: NotifyState) -> Result<Self> {
        let client = Client::new()?;
        let webhook = client.webhook(&settings.webhook_url);

        Ok(Self::with_parts(settings, client, webhook, state))
    }
}

impl<'a, F: FeedSource, N: Notifier> Poller<'a, F, N> {
    pub fn with_parts(settings: &'a Settings, source: F, notifier: N, state: NotifyState) -> Self {
        let formatter = EmbedFormatter::new(&settings.timezone, &settings.feed_url);

        Poller {
            settings,
            source,
            notifier,
            formatter,
            state,
        }
    }

    /// Poll forever. A failed cycle is logged and retried after the normal
    /// interval; nothing here ever returns.
    pub async fn run(&mut self) {
        loop {
            if let Err(e) = self.poll_once().await {
                error!("Poll cycle failed: {:#}", e);
            }

            tokio::time::sleep(self.settings.check_interval).await;
        }
    }

    /// Run a single cycle. State is only saved when the feed was fetched and
    /// parsed.
    pub async fn poll_once(&mut self) -> Result<CycleStats> {
        let events = self.source.fetch(&self.settings.feed_url).await?;

        let stats = dispatch(
            &events,
            &mut self.state,
            &self.formatter,
            &self.notifier,
            Utc::now(),
        )
        .await;

        self.state.save(&self.settings.state_file).with_context(|| {
            format!(
                "Failed to save state to {}",
                self.settings.state_file.display()
            )
        })?;

        info!(
            events = stats.events,
            sent = stats.sent(),
            first_seen = stats.first_seen,
            starting_soon = stats.starting_soon,
            failed = stats.failed,
            "Checked feed at {}",
            Utc::now().to_rfc3339()
        );

        Ok(stats)
    }
}
