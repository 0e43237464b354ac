//! Translation endpoints
//!
//! `/translations/*` is protected. `/test-translate` and
//! `/test-translations/:code` are unauthenticated variants for manual
//! testing; the former takes a form body.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::extract::{ApiForm, ApiJson, ApiPath};
use crate::error::ApiResult;
use crate::models::Asset;
use crate::services::translation::{
    self, BatchTranslateResponse, TranslateRequest, TranslationsListing,
};
use crate::AppState;

/// POST /translations/translate
pub async fn translate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TranslateRequest>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let asset = translation::translate(&state.db, state.llm.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// POST /translations/translate/batch (body is a bare array of requests)
pub async fn translate_batch(
    State(state): State<AppState>,
    ApiJson(requests): ApiJson<Vec<TranslateRequest>>,
) -> Json<BatchTranslateResponse> {
    tracing::info!(requests = requests.len(), "Batch translation started");
    let response = translation::translate_batch(&state.db, state.llm.as_ref(), &requests).await;
    tracing::info!(
        successful = response.successful,
        failed = response.failed,
        "Batch translation finished"
    );
    Json(response)
}

/// GET /translations/asset/:code/translations
pub async fn list_translations(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<Json<TranslationsListing>> {
    Ok(Json(translation::get_translations(&state.db, &code).await?))
}

/// GET /translations/asset/:code/language/:lang
pub async fn asset_in_language(
    State(state): State<AppState>,
    ApiPath((code, language)): ApiPath<(String, String)>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(
        translation::get_asset_by_language(&state.db, &code, &language).await?,
    ))
}

/// POST /test-translate (form body, no auth)
pub async fn test_translate(
    State(state): State<AppState>,
    ApiForm(request): ApiForm<TranslateRequest>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let asset = translation::translate(&state.db, state.llm.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Protected translation routes
pub fn translation_routes() -> Router<AppState> {
    Router::new()
        .route("/translations/translate", post(translate))
        .route("/translations/translate/batch", post(translate_batch))
        .route("/translations/asset/:code/translations", get(list_translations))
        .route("/translations/asset/:code/language/:lang", get(asset_in_language))
}

/// Unauthenticated test routes
pub fn test_translation_routes() -> Router<AppState> {
    Router::new()
        .route("/test-translate", post(test_translate))
        .route("/test-translations/:code", get(list_translations))
}
