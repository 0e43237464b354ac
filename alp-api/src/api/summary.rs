//! Text summarization endpoints (public)

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use super::extract::ApiJson;
use crate::error::ApiResult;
use crate::services::summary::{
    self, AnalysisRequest, AnalysisResponse, KeyPointsRequest, KeyPointsResponse,
    SentimentRequest, SentimentResponse, SummarizeRequest, SummarizeResponse, SummaryHealth,
};
use crate::AppState;

/// POST /summary/summarize
pub async fn summarize(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SummarizeRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    Ok(Json(summary::summarize(state.llm.as_ref(), &request).await?))
}

/// POST /summary/key-points
pub async fn key_points(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<KeyPointsRequest>,
) -> ApiResult<Json<KeyPointsResponse>> {
    Ok(Json(summary::extract_key_points(state.llm.as_ref(), &request).await?))
}

/// POST /summary/sentiment
pub async fn sentiment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SentimentRequest>,
) -> ApiResult<Json<SentimentResponse>> {
    Ok(Json(summary::analyze_sentiment(state.llm.as_ref(), &request).await?))
}

/// POST /summary/analyze
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    Ok(Json(summary::full_analysis(state.llm.as_ref(), &request).await?))
}

/// GET /summary/health
pub async fn summary_health(State(state): State<AppState>) -> Json<SummaryHealth> {
    Json(summary::health(state.llm.as_ref()))
}

pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/summary/summarize", post(summarize))
        .route("/summary/key-points", post(key_points))
        .route("/summary/sentiment", post(sentiment))
        .route("/summary/analyze", post(analyze))
        .route("/summary/health", get(summary_health))
}
