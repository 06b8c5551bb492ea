use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nt_core::{Error, FetchRequest, HttpClient, Result};
use scraper::Html;

pub mod jsonld;

/// Pulls a representative image out of an arbitrary article page.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the absolute URL of the page's lead image
    async fn find_image(&self, page_url: &str) -> Result<String>;
}

pub struct ImageScraper {
    http: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl ImageScraper {
    pub fn new(http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { http, timeout }
    }
}

#[async_trait]
impl Scraper for ImageScraper {
    async fn find_image(&self, page_url: &str) -> Result<String> {
        let base = utils::parse_url(page_url)?;
        let request = FetchRequest::get(page_url)
            .header("Accept", "text/html")
            .timeout(self.timeout);
        let html = self
            .http
            .fetch_text(request)
            .await
            .map_err(|e| Error::Scraping(format!("{}: {}", page_url, e)))?;

        extract_image(&html, &base)
            .ok_or_else(|| Error::Scraping(format!("No image found on {}", page_url)))
    }
}

/// Lookup order: `og:image`, `twitter:image`, JSON-LD `image`, then the
/// first `<img src>` on the page. Relative URLs resolve against `base`.
pub fn extract_image(html: &str, base: &url::Url) -> Option<String> {
    let document = Html::parse_document(html);

    utils::extract_attr(&document, "meta[property='og:image']", "content")
        .or_else(|| utils::extract_attr(&document, "meta[name='og:image']", "content"))
        .or_else(|| utils::extract_attr(&document, "meta[name='twitter:image']", "content"))
        .or_else(|| jsonld::extract_image(&document))
        .or_else(|| utils::extract_attr(&document, "img[src]", "src"))
        .and_then(|src| utils::resolve(base, &src))
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use scraper::Selector;
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::Scraping(format!("Failed to parse URL {}: {}", url, e)))
    }

    /// First non-empty value of `attr` among elements matching `selector`.
    pub fn extract_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty() && !value.starts_with("data:"))
            .map(str::to_string)
    }

    pub fn resolve(base: &Url, src: &str) -> Option<String> {
        base.join(src).ok().map(|url| url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_core::testing::StubHttp;
    use url::Url;

    fn base() -> Url {
        Url::parse("https://news.test/world/story.html").unwrap()
    }

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_og_image_wins() {
        let html = r#"<html><head>
            <meta name="twitter:image" content="https://x/twitter.png">
            <meta property="og:image" content="https://x/img.png">
            </head><body><img src="/first.png"></body></html>"#;
        assert_eq!(extract_image(html, &base()).as_deref(), Some("https://x/img.png"));
    }

    #[test]
    fn test_falls_back_to_first_img() {
        let html = r#"<body><img src="data:image/gif;base64,R0lGOD"><img src="../media/lead.jpg"><img src="/second.jpg"></body>"#;
        assert_eq!(
            extract_image(html, &base()).as_deref(),
            Some("https://news.test/media/lead.jpg")
        );
    }

    #[test]
    fn test_no_image() {
        assert!(extract_image("<p>text only</p>", &base()).is_none());
    }

    #[tokio::test]
    async fn test_find_image_errors_are_scrape_failures() {
        let stub = StubHttp::new()
            .with_response("https://news.test/ok", 200, r#"<meta property="og:image" content="/lead.png">"#)
            .with_response("https://news.test/gone", 404, "")
            .with_response("https://news.test/plain", 200, "<p>nothing</p>");
        let scraper = ImageScraper::new(Arc::new(stub), Duration::from_secs(1));

        assert_eq!(
            scraper.find_image("https://news.test/ok").await.unwrap(),
            "https://news.test/lead.png"
        );
        assert!(matches!(
            scraper.find_image("https://news.test/gone").await,
            Err(Error::Scraping(_))
        ));
        assert!(matches!(
            scraper.find_image("https://news.test/plain").await,
            Err(Error::Scraping(_))
        ));
        assert!(matches!(scraper.find_image("not a url").await, Err(Error::Scraping(_))));
    }
}
