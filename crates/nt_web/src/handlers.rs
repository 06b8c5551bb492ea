use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nt_core::{Article, CuratedArticleSubmission, Error};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub article: String,
}

/// Listing entry with the human-readable date alongside the raw one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: Article,
    pub published_date: String,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            published_date: article.display_date(),
            article,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::Validation(_) | Error::InvalidUrl(_) | Error::EmptyArticle => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

pub async fn home() -> impl IntoResponse {
    Json(json!({ "message": "AI News Analyzer is running." }))
}

/// GET /news?q=
pub async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> impl IntoResponse {
    let articles: Vec<ArticleView> = state
        .news
        .list_news(params.q.as_deref())
        .await
        .into_iter()
        .map(ArticleView::from)
        .collect();
    Json(json!({ "articles": articles }))
}

/// POST /analyze. Always answers 200 with a report; failures are carried
/// in its `error` field.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    Json(state.analyzer.report(&request.article).await)
}

/// POST /articles
pub async fn create_curated(
    State(state): State<AppState>,
    Json(submission): Json<CuratedArticleSubmission>,
) -> Response {
    match state.news.curate(&submission).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => {
            tracing::warn!("Rejected curated article: {}", e);
            error_response(&e)
        }
    }
}

/// GET /articles
pub async fn list_curated(State(state): State<AppState>) -> Response {
    match state.news.curated_articles().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            tracing::error!("Could not list curated articles: {}", e);
            error_response(&e)
        }
    }
}
