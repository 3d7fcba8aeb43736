use async_trait::async_trait;
use chrono::{DateTime, Local};
use futures::future::join_all;
use tracing::{error, info};

use crate::config::{Config, SourceConfig};
use crate::enricher::Enricher;
use crate::fetcher::{build_client, FeedPoller};
use crate::models::{
    news_id, render_timestamp, EnrichedContent, FeedEntry, GroupedHeadlines, HeadlineDigest,
    NewsItem, RelatedSource,
};

/// Something that can produce a fresh batch of news. The cache only knows this seam.
#[async_trait]
pub trait Refresh: Send + Sync {
    async fn refresh(&self) -> anyhow::Result<Vec<NewsItem>>;
}

/// Polls every source, enriches every entry concurrently and assembles the
/// ordered, truncated list of [`NewsItem`]s.
pub struct Aggregator {
    sources: Vec<SourceConfig>,
    poller: FeedPoller,
    enricher: Enricher,
    max_items: usize,
}

impl Aggregator {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = build_client(config.feed_timeout())?;

        Ok(Self::with_parts(
            config.sources.clone(),
            FeedPoller::new(client.clone(), config.entries_per_source),
            Enricher::new(client, config),
            config.max_items,
        ))
    }

    pub fn with_parts(
        sources: Vec<SourceConfig>,
        poller: FeedPoller,
        enricher: Enricher,
        max_items: usize,
    ) -> Self {
        Self {
            sources,
            poller,
            enricher,
            max_items,
        }
    }

    /// Plain feed headlines grouped by source name, without enrichment.
    /// Every configured source is present, in configured order, with an empty
    /// list if its feed failed.
    pub async fn headlines_by_source(&self) -> GroupedHeadlines {
        let polled = self.poller.poll_all(&self.sources).await;

        let mut grouped = GroupedHeadlines::default();
        for (source, entries) in self.sources.iter().zip(polled) {
            grouped.push(
                &source.name,
                entries.into_iter().map(HeadlineDigest::from).collect(),
            );
        }
        grouped
    }

    async fn collect(&self) -> Vec<NewsItem> {
        info!("Refreshing news from {} sources", self.sources.len());

        let polled = self.poller.poll_all(&self.sources).await;
        let pending: Vec<(&SourceConfig, FeedEntry)> = self
            .sources
            .iter()
            .zip(polled)
            .flat_map(|(source, entries)| entries.into_iter().map(move |entry| (source, entry)))
            .collect();

        // One task per entry so a panicking extraction only loses its own entry
        let handles: Vec<_> = pending
            .iter()
            .map(|(_, entry)| {
                let enricher = self.enricher.clone();
                let link = entry.link.clone();
                tokio::spawn(async move { enricher.enrich(&link).await })
            })
            .collect();
        let results = join_all(handles).await;

        let created_at = Local::now();
        let timestamp = render_timestamp(&created_at);

        let mut stamped: Vec<(DateTime<Local>, NewsItem)> = pending
            .into_iter()
            .zip(results)
            .filter_map(|((source, entry), result)| match result {
                Ok(content) => Some((created_at, build_item(source, entry, content, &timestamp))),
                Err(e) => {
                    error!(
                        source = %source.name,
                        link = %entry.link,
                        error = %e,
                        "Enrichment task failed, dropping entry"
                    );
                    None
                }
            })
            .collect();

        let items = newest_first(&mut stamped, self.max_items);
        info!("Aggregated {} news items", items.len());
        items
    }
}

#[async_trait]
impl Refresh for Aggregator {
    async fn refresh(&self) -> anyhow::Result<Vec<NewsItem>> {
        Ok(self.collect().await)
    }
}

pub fn build_item(
    source: &SourceConfig,
    entry: FeedEntry,
    content: EnrichedContent,
    timestamp: &str,
) -> NewsItem {
    let summary = if content.excerpt.is_empty() {
        entry.summary.unwrap_or_default()
    } else {
        content.excerpt
    };

    NewsItem {
        id: news_id(&entry.link),
        headline: entry.title,
        image_url: content.image_url,
        source: source.name.clone(),
        timestamp: timestamp.to_string(),
        summary,
        related_sources: vec![RelatedSource {
            source: source.name.clone(),
            url: entry.link,
        }],
    }
}

/// Stable sort by creation time, newest first, then keep the top `limit`.
/// Equal times keep their insertion order.
fn newest_first(stamped: &mut Vec<(DateTime<Local>, NewsItem)>, limit: usize) -> Vec<NewsItem> {
    stamped.sort_by(|a, b| b.0.cmp(&a.0));
    stamped.drain(..).take(limit).map(|(_, item)| item).collect()
}
