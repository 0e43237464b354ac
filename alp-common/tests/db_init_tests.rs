//! Tests for database initialization

use alp_common::db::init::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("alp-test.db");
    assert!(!db_path.exists());

    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let result = init_database(&url).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("existing.db").display());

    let pool1 = init_database(&url).await.expect("First open failed");
    pool1.close().await;

    let pool2 = init_database(&url).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_code_language_pair_is_unique() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("unique.db").display());
    let pool = init_database(&url).await.expect("Open failed");

    let insert = "INSERT INTO assets (id, code, name, content, language, created_at, updated_at) \
                  VALUES (?, 'GEN_AI_001', 'Intro', '<p>x</p>', 'en', '2024-01-01', '2024-01-01')";

    sqlx::query(insert).bind("a1").execute(&pool).await.unwrap();
    let second = sqlx::query(insert).bind("a2").execute(&pool).await;

    assert!(second.is_err(), "Duplicate (code, language) must be rejected");
}
