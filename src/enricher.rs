use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::extract::{ContentExtractor, HeuristicExtractor};
use crate::models::EnrichedContent;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
}

/// Fetches article pages and derives an image and excerpt for each.
///
/// Enrichment never fails from the caller's point of view: any problem with
/// the page yields [`EnrichedContent::fallback`].
#[derive(Clone)]
pub struct Enricher {
    client: Client,
    timeout: Duration,
    fallback_image: String,
    extractor: Arc<dyn ContentExtractor>,
}

impl Enricher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            timeout: config.article_timeout(),
            fallback_image: config.fallback_image.clone(),
            extractor: Arc::new(HeuristicExtractor::new(
                config.min_paragraph_chars,
                config.excerpt_max_chars,
            )),
        }
    }

    /// Swap the extraction strategy.
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub async fn enrich(&self, url: &str) -> EnrichedContent {
        let html = match self.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "Article fetch failed, using fallback");
                return EnrichedContent::fallback(&self.fallback_image);
            }
        };

        let extracted = self.extractor.extract(&html);
        debug!(
            %url,
            found_image = extracted.image_url.is_some(),
            excerpt_chars = extracted.excerpt.chars().count(),
            "Extracted article content"
        );

        EnrichedContent {
            image_url: extracted
                .image_url
                .unwrap_or_else(|| self.fallback_image.clone()),
            excerpt: extracted.excerpt,
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, EnrichError> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
