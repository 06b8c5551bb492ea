//! Scripted HTTP client for tests across the workspace.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::http::{FetchError, FetchRequest, FetchResponse, HttpClient};

struct Route {
    url_prefix: String,
    body_contains: Option<String>,
    reply: Result<FetchResponse, FetchError>,
}

/// Answers requests from a fixed route table (first match wins) and
/// records every URL it was asked for.
#[derive(Default)]
pub struct StubHttp {
    routes: Vec<Route>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StubHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url_prefix: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            url_prefix: url_prefix.to_string(),
            body_contains: None,
            reply: Ok(FetchResponse {
                status,
                body: body.to_string(),
            }),
        });
        self
    }

    /// Matches only requests whose JSON body contains `needle`.
    pub fn with_body_response(
        mut self,
        url_prefix: &str,
        needle: &str,
        status: u16,
        body: &str,
    ) -> Self {
        self.routes.push(Route {
            url_prefix: url_prefix.to_string(),
            body_contains: Some(needle.to_string()),
            reply: Ok(FetchResponse {
                status,
                body: body.to_string(),
            }),
        });
        self
    }

    pub fn with_error(mut self, url_prefix: &str, error: FetchError) -> Self {
        self.routes.push(Route {
            url_prefix: url_prefix.to_string(),
            body_contains: None,
            reply: Err(error),
        });
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.urls().iter().filter(|u| u.starts_with(prefix)).count()
    }
}

#[async_trait]
impl HttpClient for StubHttp {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());

        let body = request
            .body
            .as_ref()
            .map(|b| b.to_string())
            .unwrap_or_default();
        self.routes
            .iter()
            .find(|route| {
                request.url.starts_with(&route.url_prefix)
                    && route
                        .body_contains
                        .as_ref()
                        .map_or(true, |needle| body.contains(needle.as_str()))
            })
            .map(|route| route.reply.clone())
            .unwrap_or_else(|| Err(FetchError::Connection(format!("no stub for {}", request.url))))
    }
}
