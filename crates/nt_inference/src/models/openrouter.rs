use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nt_core::http::fetch_json;
use nt_core::{Error, FetchRequest, HttpClient, InferenceModel, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` endpoint (OpenRouter by default).
pub struct OpenRouterModel {
    http: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenRouterModel {
    pub fn new(http: Arc<dyn HttpClient>, config: &crate::Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Inference("OpenRouter API key is required".to_string()))?;
        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.model_timeout,
        })
    }
}

impl fmt::Debug for OpenRouterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterModel")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OpenRouterModel {
    fn name(&self) -> &str {
        "OpenRouter"
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let fetch = FetchRequest::post(url.as_str(), serde_json::to_value(&request)?)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout);

        tracing::debug!(model, "chat completion request");
        let response: ChatResponse = fetch_json(self.http.as_ref(), fetch)
            .await
            .map_err(|e| Error::from_fetch(&url, e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::Inference(format!("Empty completion from {}", model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use nt_core::testing::StubHttp;

    const URL: &str = "https://router.test/v1/chat/completions";

    fn config() -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            base_url: "https://router.test/v1/".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = OpenRouterModel::new(Arc::new(StubHttp::new()), &Config::default());
        assert_eq!(result.unwrap_err().to_string(), "Inference error: OpenRouter API key is required");
    }

    #[tokio::test]
    async fn test_complete_sends_chat_request() {
        let stub = Arc::new(StubHttp::new().with_response(
            URL,
            200,
            r#"{"choices": [{"message": {"role": "assistant", "content": "  hello  "}}]}"#,
        ));
        let model = OpenRouterModel::new(stub.clone(), &config()).unwrap();

        assert_eq!(model.complete("m/one", "prompt text").await.unwrap(), "hello");

        let request = &stub.requests()[0];
        assert_eq!(request.url, URL);
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["model"], "m/one");
        assert_eq!(body["messages"][0]["content"], "prompt text");
        assert_eq!(body["max_tokens"], 400);
        assert!(request
            .headers
            .contains(&("Authorization".to_string(), "Bearer test-key".to_string())));
    }

    #[tokio::test]
    async fn test_complete_failures() {
        let stub = Arc::new(
            StubHttp::new()
                .with_body_response(URL, "m/empty", 200, r#"{"choices": [{"message": {"content": ""}}]}"#)
                .with_body_response(URL, "m/none", 200, r#"{"choices": []}"#)
                .with_body_response(URL, "m/down", 500, "boom"),
        );
        let model = OpenRouterModel::new(stub, &config()).unwrap();

        assert!(matches!(model.complete("m/empty", "p").await, Err(Error::Inference(_))));
        assert!(matches!(model.complete("m/none", "p").await, Err(Error::Inference(_))));
        assert!(matches!(
            model.complete("m/down", "p").await,
            Err(Error::UpstreamBadStatus { status: 500, .. })
        ));
    }
}
