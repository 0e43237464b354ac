//! HTTP API handlers for alp-api

pub mod asset_summary;
pub mod assets;
pub mod auth;
pub mod courses;
pub mod extract;
pub mod health;
pub mod quizzes;
pub mod summary;
pub mod transformer;
pub mod translations;

pub use asset_summary::asset_summary_routes;
pub use assets::asset_routes;
pub use auth::auth_middleware;
pub use courses::course_routes;
pub use health::health_routes;
pub use quizzes::quiz_routes;
pub use summary::summary_routes;
pub use transformer::transformer_routes;
pub use translations::{test_translation_routes, translation_routes};
