//! Runtime settings.
//!
//! Settings come from the process environment, optionally layered over a
//! TOML file. They are validated once at startup; the resulting `Settings`
//! value is immutable and handed to whoever needs it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::constants::{
    DEFAULT_CHECK_INTERVAL, DEFAULT_FEED_URL, DEFAULT_STATE_FILE, DEFAULT_TIMEZONE,
};
use crate::error::{NotifyError, NotifyResult};

/// Environment variables read at startup.
pub const ENV_VARS: [&str; 5] = [
    "DISCORD_WEBHOOK_URL",
    "CTFTIME_RSS_URL",
    "CHECK_INTERVAL",
    "TIMEZONE",
    "STATE_FILE",
];

/// Settings as read, before defaults and validation.
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    pub discord_webhook_url: Option<String>,
    pub ctftime_rss_url: Option<String>,
    pub check_interval: Option<i64>,
    pub timezone: Option<String>,
    pub state_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub webhook_url: String,
    pub feed_url: String,
    pub check_interval: Duration,
    /// IANA zone name used for display only; unknown names fall back to UTC
    pub timezone: String,
    pub state_file: PathBuf,
}

impl Settings {
    /// Load settings from the process environment, over `config_file` if given.
    pub fn load(config_file: Option<&Path>) -> NotifyResult<Self> {
        let env: HashMap<String, String> = ENV_VARS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();

        Self::load_from(config_file, env)
    }

    /// Like `load`, with the environment passed in explicitly.
    ///
    /// Values are trimmed before parsing, so `CHECK_INTERVAL=" 60 "` reads as 60.
    pub fn load_from(
        config_file: Option<&Path>,
        env: HashMap<String, String>,
    ) -> NotifyResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let raw: RawSettings = builder
            .add_source(
                Environment::default()
                    .source(Some(
                        env.into_iter()
                            .map(|(key, value)| (key, value.trim().to_string()))
                            .collect(),
                    ))
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        Self::from_raw(raw)
    }

    /// Apply defaults and validate.
    pub fn from_raw(raw: RawSettings) -> NotifyResult<Self> {
        let webhook_url = raw.discord_webhook_url.ok_or_else(|| {
            NotifyError::Config("DISCORD_WEBHOOK_URL environment variable is not set".into())
        })?;
        let webhook_url = require_url("DISCORD_WEBHOOK_URL", webhook_url)?;

        let feed_url = raw
            .ctftime_rss_url
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let feed_url = require_url("CTFTIME_RSS_URL", feed_url)?;

        let check_interval = raw.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL);
        if check_interval <= 0 {
            return Err(NotifyError::Config(format!(
                "CHECK_INTERVAL must be a positive integer, got {check_interval}"
            )));
        }

        let timezone = raw.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        if timezone.trim().is_empty() {
            return Err(NotifyError::Config("TIMEZONE must not be empty".into()));
        }

        let state_file = raw
            .state_file
            .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());
        if state_file.trim().is_empty() {
            return Err(NotifyError::Config("STATE_FILE must not be empty".into()));
        }

        Ok(Settings {
            webhook_url,
            feed_url,
            check_interval: Duration::from_secs(check_interval as u64),
            timezone,
            state_file: PathBuf::from(state_file),
        })
    }
}

fn require_url(name: &str, value: String) -> NotifyResult<String> {
    if value.trim().is_empty() {
        return Err(NotifyError::Config(format!("{name} must not be empty")));
    }
    Url::parse(&value).map_err(|e| NotifyError::Config(format!("{name} is not a valid URL: {e}")))?;
    Ok(value)
}
