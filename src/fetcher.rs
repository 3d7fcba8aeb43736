use std::time::Duration;

use feed_rs::parser;
use futures::future::join_all;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SourceConfig;
use crate::extract::html_to_text;
use crate::models::FeedEntry;

pub const USER_AGENT: &str = "Papergum/1.0 (News Aggregator)";

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Parse error: {0}")]
    Parse(#[from] parser::ParseFeedError),
}

/// HTTP client shared by the poller and the enricher.
pub fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Reads RSS/Atom feeds and hands back the first few entries of each.
#[derive(Clone)]
pub struct FeedPoller {
    client: Client,
    entries_per_source: usize,
}

impl FeedPoller {
    pub fn new(client: Client, entries_per_source: usize) -> Self {
        Self {
            client,
            entries_per_source,
        }
    }

    /// Poll a single source. Unreachable or malformed feeds yield no entries.
    pub async fn poll(&self, source: &SourceConfig) -> Vec<FeedEntry> {
        match self.try_poll(source).await {
            Ok(entries) => {
                info!("Polled {} entries from '{}'", entries.len(), source.name);
                entries
            }
            Err(e) => {
                warn!(source = %source.name, url = %source.url, error = %e, "Failed to poll feed");
                Vec::new()
            }
        }
    }

    /// Poll every source concurrently. Output is positional: `result[i]` belongs to `sources[i]`.
    pub async fn poll_all(&self, sources: &[SourceConfig]) -> Vec<Vec<FeedEntry>> {
        join_all(sources.iter().map(|source| self.poll(source))).await
    }

    async fn try_poll(&self, source: &SourceConfig) -> Result<Vec<FeedEntry>, PollError> {
        debug!("Fetching feed: {} ({})", source.name, source.url);

        let response = self.client.get(&source.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PollError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let parsed = parser::parse(&bytes[..])?;

        Ok(Self::take_entries(parsed.entries, self.entries_per_source))
    }

    /// Keep feed order and stop after `limit` usable entries.
    pub fn take_entries(entries: Vec<feed_rs::model::Entry>, limit: usize) -> Vec<FeedEntry> {
        entries
            .into_iter()
            .filter_map(Self::convert_entry)
            .take(limit)
            .collect()
    }

    pub fn convert_entry(entry: feed_rs::model::Entry) -> Option<FeedEntry> {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_else(|| "Untitled".to_string());

        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        if link.is_empty() {
            warn!("Skipping entry with no link: {}", title);
            return None;
        }

        // Feed descriptions often carry markup; only the text is useful as an excerpt
        let summary = entry
            .summary
            .as_ref()
            .map(|s| html_to_text(&s.content))
            .filter(|s| !s.is_empty());

        Some(FeedEntry {
            title,
            link,
            published: entry.published.or(entry.updated),
            summary,
        })
    }
}
