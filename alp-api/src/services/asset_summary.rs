//! Stored summaries for individual assets

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::Asset;
use crate::services::llm::TextGenerator;

/// Whether an asset has a stored summary
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStatus {
    pub asset_id: String,
    pub has_summary: bool,
    pub message: String,
    pub summary: Option<String>,
    pub summary_updated_at: Option<DateTime<Utc>>,
}

/// Generate a summary of the asset's content and store it on the asset
pub async fn generate_and_store(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    asset_id: &str,
) -> ApiResult<Asset> {
    let asset = db::get_asset(pool, asset_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset {} not found", asset_id)))?;

    if asset.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "content: asset has no content to summarize".to_string(),
        ));
    }

    let raw = llm.generate(&summary_prompt(&asset.content)).await?;
    let summary = collapse_whitespace(&raw);
    if summary.is_empty() {
        return Err(ApiError::Upstream("AI returned an empty summary".to_string()));
    }

    let updated = db::set_asset_summary(pool, asset_id, &summary, Utc::now())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset {} not found", asset_id)))?;

    tracing::info!(
        asset_id = %updated.id,
        asset_code = %updated.code,
        summary_chars = summary.len(),
        "Asset summary stored"
    );

    Ok(updated)
}

pub async fn summary_status(pool: &SqlitePool, asset_id: &str) -> ApiResult<SummaryStatus> {
    let asset = db::get_asset(pool, asset_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset {} not found", asset_id)))?;

    let has_summary = asset
        .summary
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());

    Ok(SummaryStatus {
        asset_id: asset.id,
        has_summary,
        message: if has_summary {
            "Summary available".to_string()
        } else {
            "No summary generated yet".to_string()
        },
        summary: asset.summary,
        summary_updated_at: asset.summary_updated_at,
    })
}

fn summary_prompt(content: &str) -> String {
    format!(
        "You are an expert educational content analyst who writes concise, informative \
         summaries of educational materials.\n\
         \n\
         TASK: Summarize the following educational content.\n\
         \n\
         GUIDELINES:\n\
         1. Capture the main learning objectives and key concepts\n\
         2. Name the information students should remember\n\
         3. Mention practical applications or examples if present\n\
         4. Keep it to 2-4 sentences\n\
         5. Do not include HTML tags or formatting\n\
         \n\
         CONTENT TO SUMMARIZE:\n\
         {}\n\
         \n\
         Return ONLY the summary text.\n\
         \n\
         SUMMARY:",
        content
    )
}

/// Collapse every run of whitespace, newlines included, to a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
