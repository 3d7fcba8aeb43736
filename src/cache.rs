use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::aggregator::Refresh;
use crate::models::NewsItem;

/// One aggregated batch and when it was stored. Replaced wholesale, never edited.
pub struct CacheEntry {
    pub created_at: Instant,
    pub items: Arc<Vec<NewsItem>>,
}

/// Single-slot, time-bounded cache in front of a [`Refresh`] implementation.
pub struct NewsCache {
    refresher: Arc<dyn Refresh>,
    ttl: Duration,
    slot: RwLock<Option<Arc<CacheEntry>>>,
    /// Present only when concurrent misses should share a single refresh
    in_flight: Option<Mutex<()>>,
}

impl NewsCache {
    pub fn new(refresher: Arc<dyn Refresh>, ttl: Duration) -> Self {
        Self {
            refresher,
            ttl,
            slot: RwLock::new(None),
            in_flight: None,
        }
    }

    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.in_flight = enabled.then(|| Mutex::new(()));
        self
    }

    /// Latest items, refreshing first if the slot is empty or older than the TTL.
    pub async fn get(&self) -> anyhow::Result<Arc<Vec<NewsItem>>> {
        if let Some(items) = self.fresh().await {
            debug!("News cache hit");
            return Ok(items);
        }

        match &self.in_flight {
            Some(in_flight) => {
                let _guard = in_flight.lock().await;
                // Another caller may have refreshed while we waited
                if let Some(items) = self.fresh().await {
                    return Ok(items);
                }
                self.refresh_now().await
            }
            None => self.refresh_now().await,
        }
    }

    /// Linear scan of the current batch.
    pub async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<NewsItem>> {
        let items = self.get().await?;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    /// Run a refresh regardless of freshness and store the result.
    /// On failure the previous entry is left untouched.
    pub async fn refresh_now(&self) -> anyhow::Result<Arc<Vec<NewsItem>>> {
        let items = Arc::new(self.refresher.refresh().await?);

        let entry = Arc::new(CacheEntry {
            created_at: Instant::now(),
            items: items.clone(),
        });
        *self.slot.write().await = Some(entry);

        info!("News cache refreshed with {} items", items.len());
        Ok(items)
    }

    async fn fresh(&self) -> Option<Arc<Vec<NewsItem>>> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|entry| entry.created_at.elapsed() < self.ttl)
            .map(|entry| entry.items.clone())
    }
}

/// Keep the cache warm: refresh once at startup and then every `interval_minutes`.
/// An interval of zero is treated as one minute.
pub async fn start_background_refresh(cache: Arc<NewsCache>, interval_minutes: u64) {
    let interval = Duration::from_secs(interval_minutes.max(1).saturating_mul(60));

    info!("Starting initial news refresh");
    if let Err(e) = cache.refresh_now().await {
        error!("Initial news refresh failed: {:#}", e);
    }

    loop {
        tokio::time::sleep(interval).await;
        info!("Starting scheduled news refresh");
        if let Err(e) = cache.refresh_now().await {
            error!("Scheduled news refresh failed: {:#}", e);
        }
    }
}
