//! Content store: asset, course, style variant and quiz persistence
//!
//! Free functions over a shared `SqlitePool`. Schema creation lives in
//! `alp_common::db`.

pub mod assets;
pub mod courses;
pub mod quizzes;
pub mod variants;

pub use assets::*;
pub use courses::*;
pub use quizzes::*;
pub use variants::*;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    // Single connection: every new connection to :memory: is a fresh database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    alp_common::db::init_schema(&pool).await.unwrap();
    pool
}
