use std::sync::Arc;

use nt_core::{
    AnalysisReport, AnalysisResult, Credibility, Error, HttpClient, InferenceModel, Result,
};

use crate::extract::extract;
use crate::factcheck::FactChecker;
use crate::fallback::ModelFallback;
use crate::search::SimilarArticleFinder;
use crate::Config;

/// Runs the analysis pipeline for one article: claim lookup, prompt,
/// model chain, field extraction. The similar-article search runs
/// alongside and never affects the outcome.
pub struct Analyzer {
    fallback: ModelFallback,
    finder: SimilarArticleFinder,
    factcheck: FactChecker,
}

impl Analyzer {
    pub fn new(fallback: ModelFallback, finder: SimilarArticleFinder, factcheck: FactChecker) -> Self {
        Self {
            fallback,
            finder,
            factcheck,
        }
    }

    pub fn from_config(config: &Config, http: Arc<dyn HttpClient>, model: Arc<dyn InferenceModel>) -> Self {
        tracing::info!(
            "Analyzer using {} ({} then {})",
            model.name(),
            config.primary_model,
            config.secondary_model
        );
        Self::new(
            ModelFallback::new(model, &config.primary_model, &config.secondary_model),
            SimilarArticleFinder::new(
                http.clone(),
                &config.search_url,
                config.max_similar,
                config.search_timeout,
            ),
            FactChecker::new(
                http,
                &config.factcheck_url,
                config.factcheck_api_key.clone(),
                config.factcheck_timeout,
            ),
        )
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyArticle);
        }

        let model_branch = async {
            let credibility = self.factcheck.check(text).await;
            let prompt = build_prompt(text, &credibility);
            let completion = self.fallback.complete(&prompt).await?;
            Ok::<_, Error>((completion, credibility))
        };
        let (model_branch, similar_articles) = tokio::join!(model_branch, self.finder.find(text));
        let (completion, credibility) = model_branch?;

        let fields = extract(&completion.text);
        tracing::info!("Analysis produced by {}", completion.model_used);
        Ok(AnalysisResult {
            summary: fields.summary,
            emotional_bias: fields.emotional_bias,
            model_used: completion.model_used,
            similar_articles,
            credibility,
        })
    }

    /// Same as [`analyze`](Self::analyze) but always returns a report,
    /// with sentinel texts and `error` set on failure.
    pub async fn report(&self, text: &str) -> AnalysisReport {
        match self.analyze(text).await {
            Ok(result) => result.into(),
            Err(e) => {
                tracing::warn!("Analysis failed: {}", e);
                AnalysisReport::failed(&e)
            }
        }
    }
}

fn build_prompt(text: &str, credibility: &Credibility) -> String {
    let score = credibility
        .score
        .map_or_else(|| "Unknown".to_string(), |s| s.to_string());
    format!(
        "Analyze the following article. Assume all events have occurred as described.\n\n\
         Article:\n{text}\n\n\
         Fact-check result: The claim was rated '{label}' with a credibility score of {score}.\n\n\
         Respond with a single JSON object with two string fields:\n\
         \"summary\": a concise and neutral summary of the article.\n\
         \"emotional_bias\": the emotional tone or bias of the article, followed by \
         counterarguments or alternative viewpoints.\n\
         Do not reference the current date and do not add any text outside the JSON object.",
        text = text,
        label = credibility.label,
        score = score,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use nt_core::testing::StubHttp;
    use nt_core::{NEUTRAL_BIAS, NO_SUMMARY};

    use crate::models::OpenRouterModel;

    const CHAT: &str = "https://router.test/v1/chat/completions";
    const SEARCH: &str = "https://search.test/html/";

    fn config() -> Config {
        Config {
            api_key: Some("k".to_string()),
            base_url: "https://router.test/v1".to_string(),
            primary_model: "primary/model".to_string(),
            secondary_model: "secondary/model".to_string(),
            search_url: SEARCH.to_string(),
            search_timeout: Duration::from_secs(1),
            ..Config::default()
        }
    }

    fn chat_reply(content: &str) -> String {
        serde_json::json!({ "choices": [{ "message": { "content": content } }] }).to_string()
    }

    fn analyzer(stub: Arc<StubHttp>) -> Analyzer {
        let config = config();
        let model = Arc::new(OpenRouterModel::new(stub.clone(), &config).unwrap());
        Analyzer::from_config(&config, stub, model)
    }

    #[tokio::test]
    async fn test_secondary_model_answers_after_primary_500() {
        let stub = Arc::new(
            StubHttp::new()
                .with_body_response(CHAT, r#""model":"primary/model""#, 500, "upstream down")
                .with_body_response(
                    CHAT,
                    r#""model":"secondary/model""#,
                    200,
                    &chat_reply(r#"{"summary":"S","emotional_bias":"B"}"#),
                )
                .with_response(
                    SEARCH,
                    200,
                    r#"<a class="result__a" href="https://related.test/1">Related</a>"#,
                ),
        );

        let result = analyzer(stub.clone()).analyze("A long article body").await.unwrap();
        assert_eq!(result.summary, "S");
        assert_eq!(result.emotional_bias, "B");
        assert_eq!(result.model_used, "secondary/model");
        assert_eq!(result.similar_articles.len(), 1);
        assert_eq!(result.credibility, Credibility::unknown());
        assert_eq!(stub.count_prefix(CHAT), 2);
    }

    #[tokio::test]
    async fn test_lookups_use_their_own_timeouts() {
        const FACTS: &str = "https://facts.test/v1/claims:search";
        let stub = Arc::new(
            StubHttp::new()
                .with_response(FACTS, 200, r#"{"claims":[{"claimReview":[{"textualRating":"False"}]}]}"#)
                .with_response(CHAT, 200, &chat_reply(r#"{"summary":"S","emotional_bias":"B"}"#)),
        );
        let config = Config {
            factcheck_url: FACTS.to_string(),
            factcheck_api_key: Some("fk".to_string()),
            factcheck_timeout: Duration::from_secs(3),
            ..config()
        };
        let model = Arc::new(OpenRouterModel::new(stub.clone(), &config).unwrap());
        let result = Analyzer::from_config(&config, stub.clone(), model)
            .analyze("Some article")
            .await
            .unwrap();
        assert_eq!(result.credibility.score, Some(25));

        let requests = stub.requests();
        let timeout_for = |prefix: &str| {
            requests
                .iter()
                .find(|r| r.url.starts_with(prefix))
                .map(|r| r.timeout)
        };
        assert_eq!(timeout_for(FACTS), Some(Duration::from_secs(3)));
        assert_eq!(timeout_for(SEARCH), Some(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_empty_article_makes_no_requests() {
        let stub = Arc::new(StubHttp::new());
        let analyzer = analyzer(stub.clone());

        assert!(matches!(analyzer.analyze("  \n ").await, Err(Error::EmptyArticle)));
        let report = analyzer.report("").await;
        assert_eq!(report.error.as_deref(), Some("No text provided"));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_prose_reply_and_failed_search_still_succeed() {
        let stub = Arc::new(
            StubHttp::new()
                .with_response(CHAT, 200, &chat_reply("I think this article is fine."))
                .with_response(SEARCH, 500, ""),
        );
        let result = analyzer(stub).analyze("Some article").await.unwrap();
        assert_eq!(result.summary, NO_SUMMARY);
        assert_eq!(result.emotional_bias, NEUTRAL_BIAS);
        assert_eq!(result.model_used, "primary/model");
        assert!(result.similar_articles.is_empty());
    }

    #[tokio::test]
    async fn test_report_when_both_models_fail() {
        let stub = Arc::new(StubHttp::new().with_response(CHAT, 503, ""));
        let report = analyzer(stub).report("Some article").await;
        assert_eq!(report.summary, NO_SUMMARY);
        assert!(report.model_used.is_none());
        assert!(report.error.unwrap().contains("Both models failed"));
    }

    #[test]
    fn test_prompt_carries_fact_check() {
        let prompt = build_prompt(
            "Body text",
            &Credibility { score: Some(25), label: "False".to_string() },
        );
        assert!(prompt.contains("Article:\nBody text"));
        assert!(prompt.contains("rated 'False' with a credibility score of 25"));
        assert!(build_prompt("x", &Credibility::unknown()).contains("score of Unknown"));
    }
}
