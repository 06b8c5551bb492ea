use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (compatible; NewsAnalyzer/0.1)";

/// Transport-level failure. Never escapes as a panic; callers always get one
/// of these tags back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("body is not valid JSON: {0}")]
    NonJsonBody(String),

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The single network seam shared by every upstream adapter.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues the request and returns the status and raw body. Any status is
    /// returned as-is; only transport problems become errors.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;

    /// Like [`fetch`](Self::fetch) but maps non-2xx statuses to
    /// [`FetchError::HttpStatus`].
    async fn fetch_text(&self, request: FetchRequest) -> Result<String, FetchError> {
        let response = self.fetch(request).await?;
        if !response.is_success() {
            return Err(FetchError::HttpStatus(response.status));
        }
        Ok(response.body)
    }
}

/// Decodes a JSON body fetched through a trait object.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &dyn HttpClient,
    request: FetchRequest,
) -> Result<T, FetchError> {
    let body = client.fetch_text(request).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::NonJsonBody(e.to_string()))
}

#[derive(Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("client", &"<reqwest::Client>")
            .finish()
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Connection(err.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        builder = builder.timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!("{:?} {}", request.method, redact(&request.url));
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(FetchResponse { status, body })
    }
}

/// Strips credentials passed as query parameters before logging a URL.
pub fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let secret = matches!(k.as_ref(), "apikey" | "key" | "api_key" | "token");
                    let value = if secret { "<redacted>".to_string() } else { v.into_owned() };
                    (k.into_owned(), value)
                })
                .collect();
            if pairs.is_empty() {
                return parsed.to_string();
            }
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubHttp;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Payload {
        ok: bool,
    }

    #[tokio::test]
    async fn test_fetch_json_tags_failures() {
        let stub = StubHttp::new()
            .with_response("https://a.test/ok", 200, r#"{"ok": true}"#)
            .with_response("https://a.test/html", 200, "<html></html>")
            .with_response("https://a.test/down", 503, "unavailable")
            .with_error("https://a.test/slow", FetchError::Timeout);

        let ok: Payload = fetch_json(&stub, FetchRequest::get("https://a.test/ok")).await.unwrap();
        assert!(ok.ok);

        let html = fetch_json::<Payload>(&stub, FetchRequest::get("https://a.test/html")).await;
        assert!(matches!(html, Err(FetchError::NonJsonBody(_))));

        let down = fetch_json::<Payload>(&stub, FetchRequest::get("https://a.test/down")).await;
        assert_eq!(down.unwrap_err(), FetchError::HttpStatus(503));

        let slow = stub.fetch_text(FetchRequest::get("https://a.test/slow")).await;
        assert_eq!(slow.unwrap_err(), FetchError::Timeout);

        assert_eq!(stub.requests().len(), 4);
    }

    #[test]
    fn test_redact_hides_keys() {
        let redacted = redact("https://gnews.io/api/v4/top-headlines?category=world&apikey=secret");
        assert!(redacted.contains("category=world"));
        assert!(!redacted.contains("secret"));
    }
}
