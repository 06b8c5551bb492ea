use std::sync::Arc;

use nt_inference::Analyzer;
use nt_news::NewsManager;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsManager>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(news: NewsManager, analyzer: Analyzer) -> Self {
        Self {
            news: Arc::new(news),
            analyzer: Arc::new(analyzer),
        }
    }
}
