use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use nt_core::{Error, FetchRequest, HttpClient, Result, SimilarArticle};
use scraper::{Html, Selector};
use url::Url;

const QUERY_CHARS: usize = 100;

/// Best-effort related-link lookup against an HTML search endpoint.
pub struct SimilarArticleFinder {
    http: Arc<dyn HttpClient>,
    search_url: String,
    max_results: usize,
    timeout: Duration,
}

impl SimilarArticleFinder {
    pub fn new(
        http: Arc<dyn HttpClient>,
        search_url: impl Into<String>,
        max_results: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            search_url: search_url.into(),
            max_results,
            timeout,
        }
    }

    /// Up to `max_results` related links. Never fails: any problem yields
    /// an empty list.
    pub async fn find(&self, text: &str) -> Vec<SimilarArticle> {
        match self.search(text).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Similar-article search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn search(&self, text: &str) -> Result<Vec<SimilarArticle>> {
        let query = search_query(text);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = Url::parse_with_params(&self.search_url, &[("q", query.as_str())])?;
        let request = FetchRequest::get(url.as_str())
            .header("Accept", "text/html")
            .timeout(self.timeout);
        let html = self
            .http
            .fetch_text(request)
            .await
            .map_err(|e| Error::from_fetch(&self.search_url, e))?;

        let results = parse_results(&html, self.max_results);
        tracing::debug!("Found {} similar articles", results.len());
        Ok(results)
    }
}

/// Leading slice of the article, cut back to a word boundary.
fn search_query(text: &str) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= QUERY_CHARS {
        return text;
    }
    let cut: String = text.chars().take(QUERY_CHARS).collect();
    match cut.rfind(' ') {
        Some(idx) if idx > 0 => cut[..idx].to_string(),
        _ => cut,
    }
}

/// Anchor title/URL pairs from a result page, deduplicated by URL.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SimilarArticle> {
    let document = Html::parse_document(html);
    let mut results = anchors(&document, "a.result__a");
    if results.is_empty() {
        results = anchors(&document, "h2 a, h3 a");
    }

    let mut seen = HashSet::new();
    results.retain(|r| seen.insert(r.url.clone()));
    results.truncate(max_results);
    results
}

fn anchors(document: &Html, selector: &str) -> Vec<SimilarArticle> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let url = target_url(href)?;
            let title = el.text().collect::<Vec<_>>().join(" ");
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            if title.is_empty() {
                return None;
            }
            Some(SimilarArticle { title, url })
        })
        .collect()
}

/// Unwraps `/l/?uddg=<target>` redirect links and keeps only http(s) URLs.
fn target_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    let url = match url.query_pairs().find(|(key, _)| key == "uddg") {
        Some((_, target)) => Url::parse(&target).ok()?,
        None => url,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_core::testing::StubHttp;
    use nt_core::FetchError;

    const SEARCH: &str = "https://search.test/html/";

    const PAGE: &str = r#"<html><body>
        <div class="result"><h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fa.test%2Fstory&amp;rut=x">Story <b>A</b></a></h2></div>
        <div class="result"><h2><a class="result__a" href="https://b.test/other">Story B</a></h2></div>
        <div class="result"><h2><a class="result__a" href="https://a.test/story">Story A again</a></h2></div>
        <div class="result"><h2><a class="result__a" href="javascript:void(0)">Script</a></h2></div>
        <div class="result"><h2><a class="result__a" href="https://c.test/">Story C</a></h2></div>
        <div class="result"><h2><a class="result__a" href="https://d.test/">Story D</a></h2></div>
    </body></html>"#;

    #[test]
    fn test_parse_results_decodes_and_dedupes() {
        let results = parse_results(PAGE, 3);
        assert_eq!(
            results,
            vec![
                SimilarArticle { title: "Story A".to_string(), url: "https://a.test/story".to_string() },
                SimilarArticle { title: "Story B".to_string(), url: "https://b.test/other".to_string() },
                SimilarArticle { title: "Story C".to_string(), url: "https://c.test/".to_string() },
            ]
        );
    }

    #[test]
    fn test_heading_fallback() {
        let html = r#"<h3><a href="https://e.test/x">Elsewhere</a></h3>"#;
        assert_eq!(parse_results(html, 3).len(), 1);
        assert!(parse_results("<p>no links</p>", 3).is_empty());
    }

    #[test]
    fn test_search_query_cuts_at_word_boundary() {
        let text = "word ".repeat(40);
        let query = search_query(&text);
        assert!(query.chars().count() <= QUERY_CHARS);
        assert!(query.ends_with("word"));
        assert_eq!(search_query("  short\n text "), "short text");
    }

    #[tokio::test]
    async fn test_find_swallows_failures() {
        let stub = Arc::new(StubHttp::new().with_error(SEARCH, FetchError::Timeout));
        let finder = SimilarArticleFinder::new(stub.clone(), SEARCH, 3, Duration::from_secs(1));
        assert!(finder.find("Some article text").await.is_empty());
        assert_eq!(stub.count_prefix(SEARCH), 1);

        let stub = Arc::new(StubHttp::new().with_response(SEARCH, 503, ""));
        let finder = SimilarArticleFinder::new(stub, SEARCH, 3, Duration::from_secs(1));
        assert!(finder.find("Some article text").await.is_empty());
    }

    #[tokio::test]
    async fn test_find_returns_matches() {
        let stub = Arc::new(StubHttp::new().with_response(SEARCH, 200, PAGE));
        let finder = SimilarArticleFinder::new(stub.clone(), SEARCH, 2, Duration::from_secs(1));
        let results = finder.find("Budget passes parliament").await;
        assert_eq!(results.len(), 2);
        assert!(stub.urls()[0].contains("q=Budget+passes+parliament"));
    }
}
