use std::sync::Arc;
use std::time::Duration;

use nt_core::http::fetch_json;
use nt_core::{Credibility, Error, FetchRequest, HttpClient, Result};
use serde::Deserialize;
use url::Url;

const QUERY_CHARS: usize = 200;

#[derive(Deserialize)]
struct ClaimSearch {
    #[serde(default)]
    claims: Vec<Claim>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claim {
    #[serde(default)]
    textual_rating: Option<String>,
    #[serde(default)]
    claim_review: Vec<ClaimReview>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimReview {
    #[serde(default)]
    textual_rating: Option<String>,
}

impl Claim {
    fn rating(&self) -> Option<&str> {
        self.claim_review
            .first()
            .and_then(|review| review.textual_rating.as_deref())
            .or(self.textual_rating.as_deref())
            .map(str::trim)
            .filter(|rating| !rating.is_empty())
    }
}

/// Claim-search lookup that seeds the analysis prompt with a credibility
/// rating. Disabled when no key is configured.
pub struct FactChecker {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl FactChecker {
    pub fn new(
        http: Arc<dyn HttpClient>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
        }
    }

    pub async fn check(&self, text: &str) -> Credibility {
        let Some(key) = self.api_key.as_deref() else {
            tracing::debug!("No fact-check key configured, skipping lookup");
            return Credibility::unknown();
        };

        match self.lookup(text, key).await {
            Ok(credibility) => credibility,
            Err(e) => {
                tracing::warn!("Fact-check lookup failed: {}", e);
                Credibility::unknown()
            }
        }
    }

    async fn lookup(&self, text: &str, key: &str) -> Result<Credibility> {
        let query: String = text.trim().chars().take(QUERY_CHARS).collect();
        let url = Url::parse_with_params(&self.endpoint, &[("query", query.as_str()), ("key", key)])?;
        let request = FetchRequest::get(url.as_str()).timeout(self.timeout);
        let search: ClaimSearch = fetch_json(self.http.as_ref(), request)
            .await
            .map_err(|e| Error::from_fetch(&self.endpoint, e))?;

        let Some(claim) = search.claims.first() else {
            return Ok(Credibility::unknown());
        };
        Ok(match claim.rating() {
            Some(rating) => Credibility {
                score: Some(score_rating(rating)),
                label: rating.to_string(),
            },
            None => Credibility {
                score: Some(score_rating("")),
                label: "Not rated".to_string(),
            },
        })
    }
}

/// Maps a textual rating to a 0-100 score. Checks run in a fixed order, so
/// "Mostly False" scores as "Mostly".
pub fn score_rating(rating: &str) -> u8 {
    let has = |needle: &str| rating.contains(needle);
    if has("True") {
        90
    } else if has("Mostly") || has("Partly") {
        60
    } else if has("False") {
        25
    } else if has("Unproven") || has("Misleading") {
        40
    } else {
        50
    }
}
