//! Course CRUD and populated view

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{Course, CourseUpdate, NewCourse, Pagination, PopulatedCourse};
use crate::services::course;
use crate::AppState;

/// GET /course
pub async fn list_courses(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(db::list_courses(&state.db, &page).await?))
}

/// POST /course
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewCourse>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    if new.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name: must not be empty".to_string()));
    }
    let course = db::create_course(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /course/:id
pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Course>> {
    db::get_course(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| course_not_found(&id))
}

/// PUT /course/:id
pub async fn update_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(changes): ApiJson<CourseUpdate>,
) -> ApiResult<Json<Course>> {
    if changes.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("name: must not be empty".to_string()));
    }
    db::update_course(&state.db, &id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| course_not_found(&id))
}

/// DELETE /course/:id
///
/// Referenced assets are kept.
pub async fn delete_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    if db::delete_course(&state.db, &id).await? {
        tracing::info!(course_id = %id, "Course deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(course_not_found(&id))
    }
}

/// GET /course/:id/assets
pub async fn get_course_with_assets(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<PopulatedCourse>> {
    Ok(Json(course::get_course_with_assets(&state.db, &id).await?))
}

fn course_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Course {} not found", id))
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/course", get(list_courses).post(create_course))
        .route(
            "/course/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/course/:id/assets", get(get_course_with_assets))
}
