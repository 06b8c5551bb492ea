use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nt_core::dates::Timestamp;
use nt_core::http::fetch_json;
use nt_core::{Article, Error, FetchRequest, HttpClient, Provenance, Result, NO_IMAGE};
use serde::Deserialize;
use url::Url;

use super::NewsSource;
use crate::config::NewsConfig;

#[derive(Deserialize)]
struct TopHeadlines {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsArticle {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    url: String,
    image: Option<String>,
    published_at: Option<String>,
}

impl From<GNewsArticle> for Article {
    fn from(raw: GNewsArticle) -> Self {
        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());
        let image = raw
            .image
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| NO_IMAGE.to_string());

        Article {
            title,
            description: raw.description.unwrap_or_default(),
            image,
            url: raw.url,
            published_at: Timestamp::parse(raw.published_at.unwrap_or_default()),
            provenance: Provenance::Upstream,
            id: None,
        }
    }
}

/// GNews `top-headlines` endpoint, one request per category.
pub struct GNewsSource {
    http: Arc<dyn HttpClient>,
    config: NewsConfig,
}

impl GNewsSource {
    pub fn new(http: Arc<dyn HttpClient>, config: NewsConfig) -> Self {
        Self { http, config }
    }

    fn headlines_url(&self, category: &str, query: Option<&str>) -> Result<String> {
        let mut url = Url::parse(&format!(
            "{}/top-headlines",
            self.config.base_url.trim_end_matches('/')
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("category", category)
                .append_pair("lang", &self.config.lang)
                .append_pair("country", &self.config.country)
                .append_pair("max", &self.config.max_articles.to_string())
                .append_pair("apikey", self.config.api_key.as_deref().unwrap_or_default());
            if let Some(q) = query {
                pairs.append_pair("q", q);
            }
        }
        Ok(url.to_string())
    }
}

impl fmt::Debug for GNewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GNewsSource")
            .field("base_url", &self.config.base_url)
            .field("api_key", &self.config.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl NewsSource for GNewsSource {
    fn name(&self) -> &str {
        "gnews"
    }

    fn categories(&self) -> Vec<String> {
        self.config.categories.clone()
    }

    async fn fetch_category(&self, category: &str, query: Option<&str>) -> Result<Vec<Article>> {
        let url = self.headlines_url(category, query)?;
        let request = FetchRequest::get(url.as_str()).timeout(self.config.request_timeout);
        let headlines: TopHeadlines = fetch_json(self.http.as_ref(), request)
            .await
            .map_err(|e| Error::from_fetch(&nt_core::http::redact(&url), e))?;

        Ok(headlines.articles.into_iter().map(Article::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_core::testing::StubHttp;
    use nt_core::FetchError;

    const BASE: &str = "https://gnews.test/api/v4/top-headlines";

    fn config() -> NewsConfig {
        NewsConfig {
            base_url: "https://gnews.test/api/v4".to_string(),
            api_key: Some("k".to_string()),
            ..NewsConfig::default()
        }
    }

    #[test]
    fn test_headlines_url() {
        let source = GNewsSource::new(Arc::new(StubHttp::new()), config());
        let url = source.headlines_url("world", Some("climate talks")).unwrap();
        assert_eq!(
            url,
            format!("{}?category=world&lang=en&country=in&max=5&apikey=k&q=climate+talks", BASE)
        );
        let url = source.headlines_url("world", None).unwrap();
        assert!(!url.contains("&q="));
    }

    #[tokio::test]
    async fn test_fetch_category_normalizes_articles() {
        let body = r#"{"totalArticles": 2, "articles": [
            {"title": "Rain", "description": "Monsoon", "url": "https://n.test/rain",
             "image": null, "publishedAt": "2024-06-01T08:00:00Z",
             "source": {"name": "N", "url": "https://n.test"}},
            {"title": null, "url": "https://n.test/x", "publishedAt": "soon"}
        ]}"#;
        let stub = StubHttp::new().with_response(&format!("{}?category=world", BASE), 200, body);
        let source = GNewsSource::new(Arc::new(stub), config());

        let articles = source.fetch_category("world", None).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Rain");
        assert_eq!(articles[0].image, NO_IMAGE);
        assert_eq!(articles[0].provenance, Provenance::Upstream);
        assert!(articles[0].published_at.is_known());
        assert_eq!(articles[1].title, "Untitled");
        assert!(!articles[1].published_at.is_known());
        assert_eq!(articles[1].published_at.raw(), "soon");
    }

    #[tokio::test]
    async fn test_fetch_category_failures_are_tagged() {
        let stub = StubHttp::new()
            .with_response(&format!("{}?category=world", BASE), 403, "forbidden")
            .with_response(&format!("{}?category=science", BASE), 200, "<html>")
            .with_error(&format!("{}?category=nation", BASE), FetchError::Timeout);
        let source = GNewsSource::new(Arc::new(stub), config());

        assert!(matches!(
            source.fetch_category("world", None).await,
            Err(Error::UpstreamBadStatus { status: 403, .. })
        ));
        assert!(matches!(
            source.fetch_category("science", None).await,
            Err(Error::UpstreamMalformedBody(_))
        ));
        assert!(matches!(
            source.fetch_category("nation", None).await,
            Err(Error::UpstreamTimeout(_))
        ));
    }
}
