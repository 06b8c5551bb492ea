use async_trait::async_trait;

use crate::types::{CuratedArticle, CuratedArticleSubmission};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Get every curated article, newest submission first
    async fn list_curated(&self) -> Result<Vec<CuratedArticle>>;

    /// Persist a new curated article and return the stored record
    async fn store_curated(&self, submission: &CuratedArticleSubmission) -> Result<CuratedArticle>;

    /// Set the image URL of the record with the given id
    async fn update_image(&self, id: &str, image_url: &str) -> Result<()>;
}
