use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use nt_core::{Article, Result};

use crate::logging::Logger;

pub mod gnews;

pub use gnews::GNewsSource;

/// An upstream feed organised by category.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the news source
    fn name(&self) -> &str;

    /// The categories fanned out on every listing
    fn categories(&self) -> Vec<String>;

    /// Fetches one category, optionally narrowed by a free-text query
    async fn fetch_category(&self, category: &str, query: Option<&str>) -> Result<Vec<Article>>;
}

/// Queries every category of a source concurrently. A failing category is
/// logged and contributes nothing; the others are unaffected.
pub struct NewsAggregator {
    source: Arc<dyn NewsSource>,
    logger: Logger,
}

impl NewsAggregator {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        let logger = Logger::new().with_prefix(source.name());
        Self { source, logger }
    }

    pub async fn fetch_all(&self, query: Option<&str>) -> Vec<Article> {
        let categories = self.source.categories();
        let branches = categories.iter().map(|category| {
            let source = self.source.clone();
            let logger = self.logger.clone().with_prefix(category.as_str());
            async move {
                match source.fetch_category(category, query).await {
                    Ok(articles) => {
                        logger.debug(&format!("fetched {} articles", articles.len()));
                        articles
                    }
                    Err(e) => {
                        logger.warn(&format!("category skipped: {}", e));
                        Vec::new()
                    }
                }
            }
        });

        let articles: Vec<Article> = join_all(branches).await.into_iter().flatten().collect();
        self.logger.info(&format!(
            "{} articles from {} categories",
            articles.len(),
            categories.len()
        ));
        articles
    }
}
