//! alp-api library - learning platform content service
//!
//! Course and asset storage, AI translation and style variants of assets,
//! module quizzes, and text summarization over HTTP.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{ApiError, ApiResult};

use services::llm::TextGenerator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Generative-AI client
    pub llm: Arc<dyn TextGenerator>,
    /// Bearer token secret; `None` disables authentication
    pub token_secret: Option<String>,
    pub startup_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, llm: Arc<dyn TextGenerator>, token_secret: Option<String>) -> Self {
        Self {
            db,
            llm,
            token_secret,
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
///
/// Health, summary and the `/test-*` routes are public; everything else
/// requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    // Protected routes (require authentication)
    let protected = Router::new()
        .merge(api::translation_routes())
        .merge(api::course_routes())
        .merge(api::asset_routes())
        .merge(api::asset_summary_routes())
        .merge(api::quiz_routes())
        .merge(api::transformer_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .merge(api::health_routes())
        .merge(api::summary_routes())
        .merge(api::test_translation_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
