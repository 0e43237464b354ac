//! Style variant persistence
//!
//! Keyed by `(asset_code, style, domain, hobby)`; storing a variant for an
//! existing key replaces its content.

use alp_common::{Error, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::{AssetVariant, NewAssetVariant};

const VARIANT_COLUMNS: &str = "id, asset_code, style, domain, hobby, content, created_at";

fn variant_from_row(row: &SqliteRow) -> Result<AssetVariant> {
    Ok(AssetVariant {
        id: row.try_get("id")?,
        asset_code: row.try_get("asset_code")?,
        style: row.try_get("style")?,
        domain: row.try_get("domain")?,
        hobby: row.try_get("hobby")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert or replace the variant for its key and return the stored row
pub async fn upsert_variant(pool: &SqlitePool, new: NewAssetVariant) -> Result<AssetVariant> {
    let style = new.style.as_str();

    sqlx::query(
        r#"
        INSERT INTO asset_variants (id, asset_code, style, domain, hobby, content, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(asset_code, style, domain, hobby)
        DO UPDATE SET content = excluded.content, created_at = excluded.created_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&new.asset_code)
    .bind(style)
    .bind(&new.domain)
    .bind(&new.hobby)
    .bind(&new.content)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    find_variant(pool, &new.asset_code, style, &new.domain, &new.hobby)
        .await?
        .ok_or_else(|| {
            Error::Internal(format!(
                "Variant {}/{} vanished after write",
                new.asset_code, style
            ))
        })
}

/// Load the variant stored for an exact key
pub async fn find_variant(
    pool: &SqlitePool,
    asset_code: &str,
    style: &str,
    domain: &str,
    hobby: &str,
) -> Result<Option<AssetVariant>> {
    let sql = format!(
        "SELECT {} FROM asset_variants \
         WHERE asset_code = ? AND style = ? AND domain = ? AND hobby = ?",
        VARIANT_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(asset_code)
        .bind(style)
        .bind(domain)
        .bind(hobby)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(variant_from_row).transpose()
}

/// Every variant of `asset_code`, ordered by style, domain, hobby
pub async fn list_variants(pool: &SqlitePool, asset_code: &str) -> Result<Vec<AssetVariant>> {
    let sql = format!(
        "SELECT {} FROM asset_variants WHERE asset_code = ? \
         ORDER BY style ASC, domain ASC, hobby ASC",
        VARIANT_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(asset_code).fetch_all(pool).await?;
    rows.iter().map(variant_from_row).collect()
}
