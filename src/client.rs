//! HTTP client for the events feed and the Discord webhook.

use std::time::Duration;

use anyhow::{Context, Result};
use ctfnotify_core::Notifier;
use ctfnotify_core::embed::WebhookPayload;
use ctfnotify_core::error::{NotifyError, NotifyResult};
use ctfnotify_core::event::FeedEvent;
use ctfnotify_core::feed::{FeedSource, parse_feed};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client; one per process so connections are pooled.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("ctfnotify/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http })
    }

    /// GET the feed and parse it into events.
    pub async fn fetch_feed(&self, feed_url: &str) -> NotifyResult<Vec<FeedEvent>> {
        let resp = self
            .http
            .get(feed_url)
            .send()
            .await
            .map_err(|e| NotifyError::Http(format!("Failed to fetch feed {feed_url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Http(format!(
                "Feed {} returned status {}",
                feed_url, status
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| NotifyError::Http(format!("Failed to read feed body: {e}")))?;
        parse_feed(&body)
    }

    pub fn webhook(&self, url: &str) -> DiscordWebhook {
        DiscordWebhook {
            http: self.http.clone(),
            url: url.to_string(),
        }
    }
}

impl FeedSource for Client {
    async fn fetch(&self, url: &str) -> NotifyResult<Vec<FeedEvent>> {
        self.fetch_feed(url).await
    }
}

/// A Discord webhook endpoint. Each notification is one POST, never retried.
pub struct DiscordWebhook {
    http: reqwest::Client,
    url: String,
}

impl Notifier for DiscordWebhook {
    async fn notify(&self, payload: &WebhookPayload) -> NotifyResult<()> {
        let resp = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Http(format!(
                "Webhook returned status {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ctfnotify_core::{EmbedFormatter, NotificationKind};
    use std::collections::HashMap;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0"><channel><title>Upcoming CTFs</title>
<item>
  <title>Example CTF</title>
  <link>https://ctftime.org/event/9001/</link>
  <guid>abc123</guid>
  <start_date>20300101T120000</start_date>
</item>
</channel></rss>"#;

    /// Answer a single request on a local port with `status` and `body`.
    /// Returns the base URL to send the request to.
    async fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);

            // Drain the request so the client sees a clean response
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                if line.trim().is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':')
                    && name.eq_ignore_ascii_case("content-length")
                {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).await.unwrap();

            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        format!("http://{addr}")
    }

    fn payload() -> WebhookPayload {
        let event = FeedEvent::from_attributes(
            Some("abc123".into()),
            Some("Example CTF".into()),
            None,
            HashMap::new(),
        );
        let formatter = EmbedFormatter::new("UTC", "https://ctftime.org/event/list/upcoming/rss/");
        formatter
            .render(&event, NotificationKind::FirstSeen, Utc::now())
            .into()
    }

    #[tokio::test]
    async fn webhook_error_status_is_http_error() {
        let url = serve_once("400 Bad Request", "{\"embeds\": [\"0\"]}").await;
        let webhook = Client::new().unwrap().webhook(&url);

        let err = webhook.notify(&payload()).await.unwrap_err();

        match err {
            NotifyError::Http(msg) => {
                assert!(msg.contains("400"), "{msg}");
                assert!(msg.contains("embeds"), "{msg}");
            }
            other => panic!("expected an HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn webhook_success_status_is_ok() {
        let url = serve_once("204 No Content", "").await;
        let webhook = Client::new().unwrap().webhook(&url);

        webhook.notify(&payload()).await.unwrap();
    }

    #[tokio::test]
    async fn fetch_parses_served_feed() {
        let url = serve_once("200 OK", FEED).await;

        let events = Client::new().unwrap().fetch(&url).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_deref(), Some("abc123"));
        assert_eq!(events[0].title, "Example CTF");
    }

    #[tokio::test]
    async fn fetch_error_status_is_http_error() {
        let url = serve_once("503 Service Unavailable", "try later").await;

        let err = Client::new().unwrap().fetch(&url).await.unwrap_err();

        assert!(matches!(err, NotifyError::Http(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn fetch_of_non_feed_is_parse_error() {
        let url = serve_once("200 OK", "<html><body>maintenance</body></html>").await;

        let err = Client::new().unwrap().fetch(&url).await.unwrap_err();

        assert!(matches!(err, NotifyError::FeedParse(_)));
    }
}
