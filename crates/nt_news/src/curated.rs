use std::sync::Arc;

use futures::future::join_all;
use nt_core::{Article, ArticleStorage, CuratedArticle, NO_IMAGE};

use crate::logging::Logger;
use crate::scrapers::Scraper;

/// Result of reading the curated store: the listing entries plus the
/// images discovered by scraping, as `(id, image_url)` pairs still to be
/// written back.
#[derive(Debug, Default)]
pub struct CuratedLoad {
    pub articles: Vec<Article>,
    pub backfills: Vec<(String, String)>,
}

/// Turns the curated store into listing entries, backfilling missing
/// images from each article's source page.
///
/// Reading and writing are separate steps: [`load`](Self::load) never
/// touches the store, [`persist`](Self::persist) writes the discovered
/// images once the caller's other fetches are done. A failed scrape shows
/// the placeholder and is retried on the next load.
pub struct CuratedMerger {
    storage: Arc<dyn ArticleStorage>,
    scraper: Arc<dyn Scraper>,
    logger: Logger,
}

impl CuratedMerger {
    pub fn new(storage: Arc<dyn ArticleStorage>, scraper: Arc<dyn Scraper>) -> Self {
        Self {
            storage,
            scraper,
            logger: Logger::new().with_prefix("curated"),
        }
    }

    /// Loads curated articles, optionally keeping only those whose title or
    /// description contains `query` (case-insensitive).
    pub async fn load(&self, query: Option<&str>) -> CuratedLoad {
        let records = match self.storage.list_curated().await {
            Ok(records) => records,
            Err(e) => {
                self.logger.warn(&format!("could not read curated articles: {}", e));
                return CuratedLoad::default();
            }
        };

        let records: Vec<CuratedArticle> = match query.map(str::to_lowercase) {
            Some(needle) => records
                .into_iter()
                .filter(|r| {
                    r.title.to_lowercase().contains(&needle)
                        || r.description.to_lowercase().contains(&needle)
                })
                .collect(),
            None => records,
        };

        let images = join_all(records.iter().map(|record| self.resolve_image(record))).await;

        let mut load = CuratedLoad::default();
        for (record, (image, discovered)) in records.iter().zip(images) {
            if discovered {
                load.backfills.push((record.id.clone(), image.clone()));
            }
            load.articles.push(Article::from_curated(record, image));
        }
        load
    }

    /// Writes discovered images back to the store. Failures are logged and
    /// leave the record to be scraped again next time.
    pub async fn persist(&self, backfills: &[(String, String)]) {
        for (id, image) in backfills {
            match self.storage.update_image(id, image).await {
                Ok(()) => self.logger.info(&format!("backfilled image for {}", id)),
                Err(e) => self
                    .logger
                    .warn(&format!("could not persist image for {}: {}", id, e)),
            }
        }
    }

    /// Returns the image to show and whether it was freshly discovered.
    async fn resolve_image(&self, record: &CuratedArticle) -> (String, bool) {
        if !record.image_url.trim().is_empty() {
            return (record.image_url.clone(), false);
        }
        if !record.needs_image() {
            return (NO_IMAGE.to_string(), false);
        }

        match self.scraper.find_image(&record.url).await {
            Ok(image) => (image, true),
            Err(e) => {
                self.logger.debug(&format!("no image for {}: {}", record.id, e));
                (NO_IMAGE.to_string(), false)
            }
        }
    }
}
