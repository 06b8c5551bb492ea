use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use nt_core::Article;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

struct CacheEntry {
    articles: Vec<Article>,
    captured_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.articles.is_empty() && self.captured_at.elapsed() < ttl
    }
}

/// Single-slot listing cache with a fixed freshness window.
///
/// Concurrent misses coalesce: the first caller refills while the rest wait
/// on the refill lock and then read the fresh slot. A refill that overlaps
/// an [`invalidate`](Self::invalidate) hands its result to its caller but
/// does not store it.
pub struct NewsCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
    refill: Mutex<()>,
    generation: AtomicU64,
}

impl NewsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
            refill: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// The cached listing, if the slot is non-empty and still fresh.
    pub async fn get(&self) -> Option<Vec<Article>> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.articles.clone())
    }

    pub async fn get_or_refresh<F, Fut>(&self, refill: F) -> Vec<Article>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Article>>,
    {
        if let Some(articles) = self.get().await {
            tracing::debug!("news cache hit");
            return articles;
        }

        let _guard = self.refill.lock().await;
        if let Some(articles) = self.get().await {
            tracing::debug!("news cache filled by a concurrent refill");
            return articles;
        }

        tracing::debug!("news cache miss, refilling");
        let generation = self.generation.load(Ordering::SeqCst);
        let articles = refill().await;

        let mut slot = self.slot.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            *slot = Some(CacheEntry {
                articles: articles.clone(),
                captured_at: Instant::now(),
            });
        } else {
            tracing::debug!("news cache invalidated during refill, result not stored");
        }
        articles
    }

    /// Empties the slot and discards any refill already in flight.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *slot = None;
    }
}
