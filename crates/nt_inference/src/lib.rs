use std::fmt;
use std::time::Duration;

pub mod analysis;
pub mod extract;
pub mod factcheck;
pub mod fallback;
pub mod models;
pub mod search;

pub use analysis::Analyzer;
pub use extract::{extract, AnalysisFields};
pub use factcheck::FactChecker;
pub use fallback::{Completion, ModelFallback};
pub use models::create_model;
pub use search::SimilarArticleFinder;

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub primary_model: String,
    pub secondary_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub model_timeout: Duration,
    pub search_url: String,
    pub search_timeout: Duration,
    pub max_similar: usize,
    pub factcheck_url: String,
    pub factcheck_api_key: Option<String>,
    pub factcheck_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            primary_model: "deepseek/deepseek-r1:free".to_string(),
            secondary_model: "mistralai/mistral-7b-instruct:free".to_string(),
            temperature: 0.3,
            max_tokens: 400,
            model_timeout: Duration::from_secs(60),
            search_url: "https://html.duckduckgo.com/html/".to_string(),
            search_timeout: Duration::from_secs(8),
            max_similar: 3,
            factcheck_url: "https://factchecktools.googleapis.com/v1alpha1/claims:search"
                .to_string(),
            factcheck_api_key: None,
            factcheck_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("primary_model", &self.primary_model)
            .field("secondary_model", &self.secondary_model)
            .field("search_url", &self.search_url)
            .field(
                "factcheck_api_key",
                &self.factcheck_api_key.as_deref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{Analyzer, Config};
    pub use nt_core::{AnalysisReport, AnalysisResult, Error, Result};
}
