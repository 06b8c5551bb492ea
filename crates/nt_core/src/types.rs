use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::Timestamp;

/// Placeholder used whenever an article has no usable image.
pub const NO_IMAGE: &str = "https://placehold.co/600x400?text=No+Image";

pub const NO_SUMMARY: &str = "No summary available.";
pub const NEUTRAL_BIAS: &str = "Neutral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Curated,
    Upstream,
}

/// One news item, whichever source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
    pub url: String,
    pub published_at: Timestamp,
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Article {
    pub fn instant(&self) -> DateTime<Utc> {
        self.published_at.instant()
    }

    pub fn display_date(&self) -> String {
        self.published_at.display()
    }

    /// Builds the listing entry for a curated record, using `image` in place
    /// of the stored (possibly empty) image URL.
    pub fn from_curated(record: &CuratedArticle, image: String) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            image,
            url: record.url.clone(),
            published_at: Timestamp::parse(record.published_at.clone()),
            provenance: Provenance::Curated,
            id: Some(record.id.clone()),
        }
    }
}

/// A curated article as persisted. `image_url` is empty until someone
/// supplies one or a backfill discovers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub published_at: String,
    pub created_at: DateTime<Utc>,
}

impl CuratedArticle {
    pub fn needs_image(&self) -> bool {
        self.image_url.trim().is_empty() && !self.url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedArticleSubmission {
    pub title: String,
    #[serde(alias = "source_url")]
    pub url: String,
    pub published_at: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CuratedArticleSubmission {
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::Error::Validation("title is required".to_string()));
        }
        if self.url.trim().is_empty() {
            return Err(crate::Error::Validation("source url is required".to_string()));
        }
        if self.published_at.trim().is_empty() {
            return Err(crate::Error::Validation("published date is required".to_string()));
        }
        url::Url::parse(self.url.trim())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarArticle {
    pub title: String,
    pub url: String,
}

/// Outcome of the claim lookup that precedes the model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credibility {
    pub score: Option<u8>,
    pub label: String,
}

impl Credibility {
    pub fn unknown() -> Self {
        Self {
            score: None,
            label: "No data found".to_string(),
        }
    }
}

impl Default for Credibility {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub emotional_bias: String,
    pub model_used: String,
    pub similar_articles: Vec<SimilarArticle>,
    pub credibility: Credibility,
}

/// What the analyze operation hands to callers: always fully populated,
/// with `error` set when the analysis itself could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: String,
    pub emotional_bias: String,
    pub similar_articles: Vec<SimilarArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credibility: Option<Credibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    pub fn failed(error: &crate::Error) -> Self {
        Self {
            summary: NO_SUMMARY.to_string(),
            emotional_bias: NEUTRAL_BIAS.to_string(),
            similar_articles: Vec::new(),
            model_used: None,
            credibility: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<AnalysisResult> for AnalysisReport {
    fn from(result: AnalysisResult) -> Self {
        Self {
            summary: result.summary,
            emotional_bias: result.emotional_bias,
            similar_articles: result.similar_articles,
            model_used: Some(result.model_used),
            credibility: Some(result.credibility),
            error: None,
        }
    }
}
