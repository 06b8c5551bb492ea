use std::fmt;

use async_trait::async_trait;
use nt_core::{InferenceModel, Result, NEUTRAL_BIAS};

/// Offline stand-in that answers every prompt with the first words of the
/// article as its summary.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, _model: &str, prompt: &str) -> Result<String> {
        let article = prompt
            .split_once("Article:")
            .map(|(_, rest)| rest)
            .unwrap_or(prompt);
        let article = article
            .split_once("Fact-check result:")
            .map_or(article, |(body, _)| body);
        let words: Vec<&str> = article.split_whitespace().take(20).collect();
        let reply = serde_json::json!({
            "summary": words.join(" "),
            "emotional_bias": NEUTRAL_BIAS,
        });
        Ok(reply.to_string())
    }
}
