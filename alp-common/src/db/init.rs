//! Database initialization
//!
//! Opens (creating if needed) the content database and creates the
//! `assets`, `courses`, `asset_variants` and `quizzes` tables. Safe to run
//! on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

/// Connect to `database_url` and create tables if needed
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("Connected to database: {}", redact_url(database_url));

    // WAL allows concurrent readers with one writer
    if !database_url.contains(":memory:") {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_assets_table(pool).await?;
    create_courses_table(pool).await?;
    create_asset_variants_table(pool).await?;
    create_quizzes_table(pool).await?;
    info!("Database tables initialized (assets, courses, asset_variants, quizzes)");
    Ok(())
}

async fn create_assets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            style TEXT NOT NULL DEFAULT 'original',
            content TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'en',
            source_asset_id TEXT,
            summary TEXT,
            summary_updated_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // At most one asset per (code, language)
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_assets_code_language ON assets(code, language)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_courses_table(pool: &SqlitePool) -> Result<()> {
    // modules: JSON array of {type, code, assets: [asset_code, ...]}
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            modules TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_asset_variants_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS asset_variants (
            id TEXT PRIMARY KEY,
            asset_code TEXT NOT NULL,
            style TEXT NOT NULL,
            domain TEXT NOT NULL,
            hobby TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One variant per (code, style, domain, hobby); regenerating replaces it
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_asset_variants_key
        ON asset_variants(asset_code, style, domain, hobby)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_quizzes_table(pool: &SqlitePool) -> Result<()> {
    // questions: JSON array of {question, options, correct_answer, explanation}
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quizzes (
            id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL,
            module_index INTEGER NOT NULL,
            module_code TEXT,
            title TEXT NOT NULL,
            difficulty TEXT NOT NULL,
            questions TEXT NOT NULL,
            estimated_time_minutes INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_quizzes_module ON quizzes(course_id, module_index)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Strip credentials from a connection string before logging it
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url() {
        assert_eq!(redact_url("sqlite://alp.db?mode=rwc"), "sqlite://alp.db?mode=rwc");
        assert_eq!(
            redact_url("postgres://user:pw@host/db"),
            "postgres://***@host/db"
        );
    }
}
