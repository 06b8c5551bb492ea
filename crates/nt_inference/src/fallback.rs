use std::sync::Arc;

use nt_core::{Error, InferenceModel, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model_used: String,
}

/// Two-step model chain: the primary model, then the secondary once if the
/// primary fails for any reason. No further retries.
#[derive(Debug)]
pub struct ModelFallback {
    model: Arc<dyn InferenceModel>,
    primary: String,
    secondary: String,
}

impl ModelFallback {
    pub fn new(
        model: Arc<dyn InferenceModel>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        Self {
            model,
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<Completion> {
        let primary_err = match self.attempt(&self.primary, prompt).await {
            Ok(completion) => return Ok(completion),
            Err(e) => e,
        };
        tracing::warn!(
            "Primary model {} failed ({}), falling back to {}",
            self.primary,
            primary_err,
            self.secondary
        );

        self.attempt(&self.secondary, prompt).await.map_err(|secondary_err| {
            tracing::error!("Secondary model {} failed: {}", self.secondary, secondary_err);
            Error::ModelBothFailed {
                primary: primary_err.to_string(),
                secondary: secondary_err.to_string(),
            }
        })
    }

    async fn attempt(&self, model: &str, prompt: &str) -> Result<Completion> {
        let text = self.model.complete(model, prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Inference(format!("Empty completion from {}", model)));
        }
        Ok(Completion {
            text: text.to_string(),
            model_used: model.to_string(),
        })
    }
}
