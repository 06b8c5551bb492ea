use std::time::Duration;

pub const DEFAULT_CATEGORIES: &[&str] = &["general", "world", "science", "nation"];

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub categories: Vec<String>,
    pub lang: String,
    pub country: String,
    pub max_articles: u32,
    pub request_timeout: Duration,
    pub scrape_timeout: Duration,
    /// How long a cached listing stays fresh.
    pub cache_ttl: Duration,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gnews.io/api/v4".to_string(),
            api_key: None,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            lang: "en".to_string(),
            country: "in".to_string(),
            max_articles: 5,
            request_timeout: Duration::from_secs(10),
            scrape_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(30 * 60),
        }
    }
}
