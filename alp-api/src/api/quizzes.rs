//! Quiz endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::extract::{ApiJson, ApiPath};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::Quiz;
use crate::services::quiz::{self, QuizGenerationRequest, QuizGenerationResponse};
use crate::AppState;

/// POST /quiz/generate
pub async fn generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuizGenerationRequest>,
) -> ApiResult<Json<QuizGenerationResponse>> {
    Ok(Json(
        quiz::generate_quizzes(&state.db, state.llm.as_ref(), &request).await?,
    ))
}

/// GET /quiz/course/:course_id
pub async fn course_quizzes(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<String>,
) -> ApiResult<Json<Vec<Quiz>>> {
    Ok(Json(quiz::course_quizzes(&state.db, &course_id).await?))
}

/// GET /quiz/:id
pub async fn get_quiz(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Quiz>> {
    db::get_quiz(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| quiz_not_found(&id))
}

/// DELETE /quiz/:id
pub async fn delete_quiz(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    if db::delete_quiz(&state.db, &id).await? {
        tracing::info!(quiz_id = %id, "Quiz deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(quiz_not_found(&id))
    }
}

fn quiz_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Quiz {} not found", id))
}

pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/quiz/generate", post(generate))
        .route("/quiz/course/:course_id", get(course_quizzes))
        .route("/quiz/:id", get(get_quiz).delete(delete_quiz))
}
