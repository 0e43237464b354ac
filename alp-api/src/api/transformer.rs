//! Content transformer endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::ApiResult;
use crate::models::AssetVariant;
use crate::services::transformer::{self, TransformRequest, VariantLookup, VariantQuery};
use crate::AppState;

/// POST /content-transformer/transform
pub async fn transform(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TransformRequest>,
) -> ApiResult<Json<AssetVariant>> {
    Ok(Json(
        transformer::transform(&state.db, state.llm.as_ref(), &request).await?,
    ))
}

/// GET /content-transformer/get-or-generate?code=&style=&domain=&hobby=
pub async fn get_or_generate(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VariantQuery>,
) -> ApiResult<Json<VariantLookup>> {
    Ok(Json(
        transformer::get_or_generate(&state.db, state.llm.as_ref(), &query).await?,
    ))
}

/// GET /content-transformer/variants/:code
pub async fn list_variants(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<Json<Vec<AssetVariant>>> {
    Ok(Json(transformer::list_variants(&state.db, &code).await?))
}

pub fn transformer_routes() -> Router<AppState> {
    Router::new()
        .route("/content-transformer/transform", post(transform))
        .route("/content-transformer/get-or-generate", get(get_or_generate))
        .route("/content-transformer/variants/:code", get(list_variants))
}
