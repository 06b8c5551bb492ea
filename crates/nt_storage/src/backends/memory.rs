use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use nt_core::{ArticleStorage, CuratedArticle, CuratedArticleSubmission, Error, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<CuratedArticle>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_curated(&mut self, submission: &CuratedArticleSubmission) -> CuratedArticle {
        let record = CuratedArticle {
            id: Uuid::new_v4().to_string(),
            title: submission.title.trim().to_string(),
            description: submission.description.clone().unwrap_or_default(),
            url: submission.url.trim().to_string(),
            image_url: submission.image_url.clone().unwrap_or_default(),
            published_at: submission.published_at.trim().to_string(),
            created_at: Utc::now(),
        };
        self.articles.push(record.clone());
        record
    }

    pub fn list_curated(&self) -> Vec<CuratedArticle> {
        self.articles.iter().rev().cloned().collect()
    }

    pub fn update_image(&mut self, id: &str, image_url: &str) -> Result<()> {
        let record = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::Persistence(format!("No curated article with id {}", id)))?;
        record.image_url = image_url.to_string();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn list_curated(&self) -> Result<Vec<CuratedArticle>> {
        let store = self.store.read().await;
        Ok(store.list_curated())
    }

    async fn store_curated(&self, submission: &CuratedArticleSubmission) -> Result<CuratedArticle> {
        let mut store = self.store.write().await;
        Ok(store.store_curated(submission))
    }

    async fn update_image(&self, id: &str, image_url: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.update_image(id, image_url)
    }
}
