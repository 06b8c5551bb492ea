use std::fmt;

use async_trait::async_trait;

use crate::Result;

/// A chat-completion provider that can serve several named models.
#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send a single user prompt to `model` and return the reply text.
    /// Empty replies are errors.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}
