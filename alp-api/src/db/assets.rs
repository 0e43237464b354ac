//! Asset persistence
//!
//! Originals and their translation records share the `assets` table; the
//! unique `(code, language)` index makes a second record for the same pair
//! fail with [`Error::Conflict`].

use alp_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Asset, AssetUpdate, NewAsset, Pagination};

const ASSET_COLUMNS: &str = "id, code, name, style, content, language, source_asset_id, \
                             summary, summary_updated_at, created_at, updated_at";

fn asset_from_row(row: &SqliteRow) -> Result<Asset> {
    Ok(Asset {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        style: row.try_get("style")?,
        content: row.try_get("content")?,
        language: row.try_get("language")?,
        source_asset_id: row.try_get("source_asset_id")?,
        summary: row.try_get("summary")?,
        summary_updated_at: row.try_get("summary_updated_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_unique_violation(err: sqlx::Error, code: &str, language: &str) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Error::Conflict(format!(
            "Asset with code '{}' in language '{}' already exists",
            code, language
        )),
        _ => Error::Database(err),
    }
}

/// Insert a new asset and return the stored document
pub async fn create_asset(pool: &SqlitePool, new: NewAsset) -> Result<Asset> {
    let now = Utc::now();
    let asset = Asset {
        id: Uuid::new_v4().to_string(),
        code: new.code,
        name: new.name,
        style: new.style,
        content: new.content,
        language: new.language,
        source_asset_id: new.source_asset_id,
        summary: None,
        summary_updated_at: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO assets (
            id, code, name, style, content, language, source_asset_id,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&asset.id)
    .bind(&asset.code)
    .bind(&asset.name)
    .bind(&asset.style)
    .bind(&asset.content)
    .bind(&asset.language)
    .bind(&asset.source_asset_id)
    .bind(asset.created_at)
    .bind(asset.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_unique_violation(e, &asset.code, &asset.language))?;

    tracing::debug!(
        asset_id = %asset.id,
        code = %asset.code,
        language = %asset.language,
        "Asset created"
    );

    Ok(asset)
}

/// Load asset by id
pub async fn get_asset(pool: &SqlitePool, id: &str) -> Result<Option<Asset>> {
    let sql = format!("SELECT {} FROM assets WHERE id = ?", ASSET_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(asset_from_row).transpose()
}

/// Load the asset with `code` in `language`
pub async fn find_asset_by_code(
    pool: &SqlitePool,
    code: &str,
    language: &str,
) -> Result<Option<Asset>> {
    let sql = format!(
        "SELECT {} FROM assets WHERE code = ? AND language = ?",
        ASSET_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(code)
        .bind(language)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(asset_from_row).transpose()
}

/// All language variants of `code`, ordered by language
pub async fn list_assets_by_code(pool: &SqlitePool, code: &str) -> Result<Vec<Asset>> {
    let sql = format!(
        "SELECT {} FROM assets WHERE code = ? ORDER BY language ASC",
        ASSET_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(code).fetch_all(pool).await?;
    rows.iter().map(asset_from_row).collect()
}

/// Page through assets in creation order
pub async fn list_assets(pool: &SqlitePool, page: &Pagination) -> Result<Vec<Asset>> {
    let (offset, limit) = page.bounds();
    let sql = format!(
        "SELECT {} FROM assets ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?",
        ASSET_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    rows.iter().map(asset_from_row).collect()
}

/// Apply a partial update; `None` if the asset does not exist
pub async fn update_asset(
    pool: &SqlitePool,
    id: &str,
    changes: AssetUpdate,
) -> Result<Option<Asset>> {
    let result = sqlx::query(
        r#"
        UPDATE assets SET
            name = COALESCE(?, name),
            style = COALESCE(?, style),
            content = COALESCE(?, content),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.style)
    .bind(&changes.content)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_asset(pool, id).await
}

/// Store a generated summary; `None` if the asset does not exist
pub async fn set_asset_summary(
    pool: &SqlitePool,
    id: &str,
    summary: &str,
    at: DateTime<Utc>,
) -> Result<Option<Asset>> {
    let result = sqlx::query(
        "UPDATE assets SET summary = ?, summary_updated_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(summary)
    .bind(at)
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_asset(pool, id).await
}

/// Delete asset by id; returns whether a row was removed
///
/// Courses referencing the asset are not touched.
pub async fn delete_asset(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM assets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_asset(code: &str, language: &str) -> NewAsset {
        NewAsset {
            code: code.to_string(),
            name: format!("{} name", code),
            style: "original".to_string(),
            content: format!("<p>{} {}</p>", code, language),
            language: language.to_string(),
            source_asset_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_load_asset() {
        let pool = test_pool().await;

        let created = create_asset(&pool, new_asset("GEN_AI_001", "en")).await.unwrap();
        let loaded = get_asset(&pool, &created.id).await.unwrap().expect("Asset not found");

        assert_eq!(loaded, created);
        assert!(!loaded.is_translation());
    }

    #[tokio::test]
    async fn test_duplicate_code_language_is_conflict() {
        let pool = test_pool().await;

        create_asset(&pool, new_asset("GEN_AI_001", "en")).await.unwrap();
        let err = create_asset(&pool, new_asset("GEN_AI_001", "en")).await.unwrap_err();

        assert!(matches!(err, Error::Conflict(_)), "unexpected error: {:?}", err);

        // Same code in another language is fine
        create_asset(&pool, new_asset("GEN_AI_001", "hi")).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_code_and_language() {
        let pool = test_pool().await;
        create_asset(&pool, new_asset("C1", "en")).await.unwrap();
        create_asset(&pool, new_asset("C1", "te")).await.unwrap();

        let te = find_asset_by_code(&pool, "C1", "te").await.unwrap().unwrap();
        assert_eq!(te.language, "te");
        assert!(find_asset_by_code(&pool, "C1", "hi").await.unwrap().is_none());

        let all = list_assets_by_code(&pool, "C1").await.unwrap();
        let languages: Vec<_> = all.iter().map(|a| a.language.as_str()).collect();
        assert_eq!(languages, vec!["en", "te"]);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let pool = test_pool().await;
        let created = create_asset(&pool, new_asset("C1", "en")).await.unwrap();

        let updated = update_asset(
            &pool,
            &created.id,
            AssetUpdate {
                content: Some("<p>new</p>".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.content, "<p>new</p>");
        assert_eq!(updated.name, created.name);
        assert!(updated.updated_at >= created.updated_at);

        assert!(update_asset(&pool, "missing", AssetUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_asset() {
        let pool = test_pool().await;
        let created = create_asset(&pool, new_asset("C1", "en")).await.unwrap();

        assert!(delete_asset(&pool, &created.id).await.unwrap());
        assert!(!delete_asset(&pool, &created.id).await.unwrap());
        assert!(get_asset(&pool, &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_assets_pagination() {
        let pool = test_pool().await;
        for i in 0..5 {
            create_asset(&pool, new_asset(&format!("C{}", i), "en")).await.unwrap();
        }

        let page = list_assets(&pool, &Pagination { skip: 1, limit: 2 }).await.unwrap();
        assert_eq!(page.len(), 2);

        let all = list_assets(&pool, &Pagination::default()).await.unwrap();
        assert_eq!(all.len(), 5);
    }
}
