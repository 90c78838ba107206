//! ctfnotify - announce upcoming CTFs to a Discord channel.
//!
//! Polls the CTFtime upcoming-events feed and posts an embed to a Discord
//! webhook when an event first appears and again when it is about to start.
//!
//! Configuration is read from the environment (and a `.env` file):
//!   DISCORD_WEBHOOK_URL  (required)
//!   CTFTIME_RSS_URL, CHECK_INTERVAL, TIMEZONE, STATE_FILE  (optional)

mod client;
mod poller;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ctfnotify_core::{NotifyState, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::poller::Poller;

#[derive(Parser)]
#[command(name = "ctfnotify")]
#[command(version, about = "Announce new and imminent CTFs from CTFtime to a Discord webhook")]
struct Cli {
    /// TOML file with settings; environment variables take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Settings::load(cli.config.as_deref())?;
    let state = NotifyState::load(&settings.state_file).with_context(|| {
        format!(
            "Failed to load state from {}",
            settings.state_file.display()
        )
    })?;

    if state.is_empty() {
        info!("No notification state yet; every event in the feed will be announced");
    }

    info!(
        interval = settings.check_interval.as_secs(),
        timezone = %settings.timezone,
        feed = %settings.feed_url,
        state_file = %settings.state_file.display(),
        "ctfnotify v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let mut poller = Poller::new(&settings, state)?;

    if cli.once {
        poller.poll_once().await?;
        return Ok(());
    }

    poller.run().await;
    Ok(())
}
