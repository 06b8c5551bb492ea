use std::sync::Arc;

use nt_core::{Error, HttpClient, Result};

use crate::Config;

pub mod dummy;
pub mod openrouter;

pub use dummy::DummyModel;
pub use nt_core::InferenceModel;
pub use openrouter::OpenRouterModel;

/// Builds the chat provider named `name` (`openrouter` or `dummy`).
pub fn create_model(
    name: &str,
    config: &Config,
    http: Arc<dyn HttpClient>,
) -> Result<Arc<dyn InferenceModel>> {
    match name.to_lowercase().as_str() {
        "openrouter" => Ok(Arc::new(OpenRouterModel::new(http, config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Inference(format!(
            "Unknown model provider: {}. Available providers: openrouter, dummy",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_core::testing::StubHttp;

    #[test]
    fn test_create_model() {
        let http: Arc<dyn HttpClient> = Arc::new(StubHttp::new());
        let config = Config {
            api_key: Some("key".to_string()),
            ..Config::default()
        };
        assert_eq!(create_model("openrouter", &config, http.clone()).unwrap().name(), "OpenRouter");
        assert_eq!(create_model("Dummy", &config, http.clone()).unwrap().name(), "Dummy");
        assert!(create_model("ollama", &config, http.clone()).is_err());
        assert!(create_model("openrouter", &Config::default(), http).is_err());
    }
}
