//! Stored asset summary endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::extract::{ApiJson, ApiPath};
use crate::error::ApiResult;
use crate::models::Asset;
use crate::services::asset_summary::{self, SummaryStatus};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateSummaryRequest {
    pub asset_id: String,
}

/// POST /asset-summary/generate
pub async fn generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateSummaryRequest>,
) -> ApiResult<Json<Asset>> {
    let asset =
        asset_summary::generate_and_store(&state.db, state.llm.as_ref(), &request.asset_id).await?;
    Ok(Json(asset))
}

/// GET /asset-summary/status/:id
pub async fn status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<SummaryStatus>> {
    Ok(Json(asset_summary::summary_status(&state.db, &id).await?))
}

pub fn asset_summary_routes() -> Router<AppState> {
    Router::new()
        .route("/asset-summary/generate", post(generate))
        .route("/asset-summary/status/:id", get(status))
}
