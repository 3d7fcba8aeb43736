use chrono::{DateTime, Local, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Render format of `NewsItem::timestamp`, e.g. `19.10.2026 14:05`.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// One entry read from a source's feed. Lives only for the duration of a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// Image and excerpt scraped from an article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedContent {
    pub image_url: String,
    pub excerpt: String,
}

impl EnrichedContent {
    pub fn fallback(image_url: &str) -> Self {
        Self {
            image_url: image_url.to_string(),
            excerpt: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedSource {
    pub source: String,
    pub url: String,
}

/// The record served to the frontend. Field names are part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub headline: String,
    pub image_url: String,
    pub source: String,
    pub timestamp: String,
    pub summary: String,
    pub related_sources: Vec<RelatedSource>,
}

/// Plain headline listing used by the grouped-by-source endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineDigest {
    pub title: String,
    pub summary: String,
    pub link: String,
    /// RFC 2822, the `pubDate` form; empty when the feed gave no date
    pub published: String,
}

impl From<FeedEntry> for HeadlineDigest {
    fn from(entry: FeedEntry) -> Self {
        Self {
            title: entry.title,
            summary: entry.summary.unwrap_or_default(),
            link: entry.link,
            published: entry
                .published
                .map(|at| at.to_rfc2822())
                .unwrap_or_default(),
        }
    }
}

/// Headlines keyed by source name, serialized as a JSON object in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedHeadlines(Vec<(String, Vec<HeadlineDigest>)>);

impl GroupedHeadlines {
    /// Append under `source`. A name seen before extends its existing group.
    pub fn push(&mut self, source: &str, digests: Vec<HeadlineDigest>) {
        match self.0.iter_mut().find(|(name, _)| name == source) {
            Some((_, existing)) => existing.extend(digests),
            None => self.0.push((source.to_string(), digests)),
        }
    }

    pub fn get(&self, source: &str) -> Option<&[HeadlineDigest]> {
        self.0
            .iter()
            .find(|(name, _)| name == source)
            .map(|(_, digests)| digests.as_slice())
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Serialize for GroupedHeadlines {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (source, digests) in &self.0 {
            map.serialize_entry(source, digests)?;
        }
        map.end()
    }
}

/// Stable id for an article: UUIDv5 of the link in the URL namespace.
pub fn news_id(link: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, link.as_bytes()).to_string()
}

pub fn render_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
