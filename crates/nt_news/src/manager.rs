use std::collections::HashSet;
use std::sync::Arc;

use nt_core::{
    Article, ArticleStorage, CuratedArticle, CuratedArticleSubmission, HttpClient, Result,
};

use crate::cache::NewsCache;
use crate::config::NewsConfig;
use crate::curated::CuratedMerger;
use crate::scrapers::{ImageScraper, Scraper};
use crate::sources::{GNewsSource, NewsAggregator, NewsSource};

/// Entry point for the news listing: upstream fan-out plus curated
/// articles, merged, sorted and cached.
pub struct NewsManager {
    aggregator: NewsAggregator,
    curated: CuratedMerger,
    storage: Arc<dyn ArticleStorage>,
    cache: NewsCache,
}

impl NewsManager {
    pub fn new(
        source: Arc<dyn NewsSource>,
        storage: Arc<dyn ArticleStorage>,
        scraper: Arc<dyn Scraper>,
        cache: NewsCache,
    ) -> Self {
        Self {
            aggregator: NewsAggregator::new(source),
            curated: CuratedMerger::new(storage.clone(), scraper),
            storage,
            cache,
        }
    }

    /// Wires the GNews source and page scraper over a shared HTTP client.
    pub fn from_config(
        config: NewsConfig,
        http: Arc<dyn HttpClient>,
        storage: Arc<dyn ArticleStorage>,
    ) -> Self {
        let scraper = Arc::new(ImageScraper::new(http.clone(), config.scrape_timeout));
        let cache = NewsCache::new(config.cache_ttl);
        let source = Arc::new(GNewsSource::new(http, config));
        Self::new(source, storage, scraper, cache)
    }

    /// Newest-first listing. Unfiltered listings go through the cache;
    /// queried listings are always fetched and never stored.
    pub async fn list_news(&self, query: Option<&str>) -> Vec<Article> {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => {
                tracing::info!("Listing news for query {:?} (uncached)", query);
                self.collect(Some(query)).await
            }
            None => self.cache.get_or_refresh(|| self.collect(None)).await,
        }
    }

    async fn collect(&self, query: Option<&str>) -> Vec<Article> {
        let (curated, upstream) =
            tokio::join!(self.curated.load(query), self.aggregator.fetch_all(query));
        self.curated.persist(&curated.backfills).await;

        let mut articles = dedupe_by_url(curated.articles.into_iter().chain(upstream));
        sort_newest_first(&mut articles);
        tracing::info!("Assembled {} articles", articles.len());
        articles
    }

    /// Validates and stores a curated article, then drops the cached
    /// listing so the next call picks it up.
    pub async fn curate(&self, submission: &CuratedArticleSubmission) -> Result<CuratedArticle> {
        submission.validate()?;
        let record = self.storage.store_curated(submission).await?;
        self.cache.invalidate().await;
        tracing::info!("Curated article stored: {} ({})", record.title, record.id);
        Ok(record)
    }

    pub async fn curated_articles(&self) -> Result<Vec<CuratedArticle>> {
        self.storage.list_curated().await
    }
}

/// Keeps the first article seen for each non-empty URL.
pub fn dedupe_by_url(articles: impl IntoIterator<Item = Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| a.url.is_empty() || seen.insert(a.url.clone()))
        .collect()
}

/// Stable sort by normalized instant, newest first. Unparseable dates carry
/// the minimum instant and end up last.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.instant().cmp(&a.instant()));
}
