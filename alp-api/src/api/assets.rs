//! Asset CRUD under `/course/assets`

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{Asset, AssetUpdate, Language, NewAsset, Pagination};
use crate::AppState;

/// GET /course/assets
pub async fn list_assets(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Asset>>> {
    Ok(Json(db::list_assets(&state.db, &page).await?))
}

/// POST /course/assets
pub async fn create_asset(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewAsset>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    validate_new_asset(&new)?;
    let asset = db::create_asset(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET /course/assets/:id
pub async fn get_asset(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Asset>> {
    db::get_asset(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| asset_not_found(&id))
}

/// PUT /course/assets/:id
pub async fn update_asset(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(changes): ApiJson<AssetUpdate>,
) -> ApiResult<Json<Asset>> {
    if changes.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }
    db::update_asset(&state.db, &id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| asset_not_found(&id))
}

/// DELETE /course/assets/:id
pub async fn delete_asset(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    if db::delete_asset(&state.db, &id).await? {
        tracing::info!(asset_id = %id, "Asset deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(asset_not_found(&id))
    }
}

fn validate_new_asset(new: &NewAsset) -> ApiResult<()> {
    if new.code.trim().is_empty() {
        return Err(ApiError::BadRequest("code: must not be empty".to_string()));
    }
    if new.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name: must not be empty".to_string()));
    }
    new.language
        .parse::<Language>()
        .map_err(|e| ApiError::BadRequest(format!("language: {}", e)))?;
    Ok(())
}

fn asset_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Asset {} not found", id))
}

pub fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/course/assets", get(list_assets).post(create_asset))
        .route(
            "/course/assets/:id",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
}
