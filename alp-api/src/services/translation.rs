//! Translation records
//!
//! A translation is an asset sharing its original's `code`, tagged with a
//! target language and linked back through `source_asset_id`. At most one
//! exists per (code, language).

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{Asset, Language, NewAsset, SOURCE_LANGUAGE};
use crate::services::llm::TextGenerator;

/// Translation request
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    pub asset_code: String,
    pub target_language: String,
    pub content: String,
}

/// Outcome of one batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Error,
}

/// Batch item result, tagged with the request it came from
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub asset_code: String,
    pub target_language: String,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Batch translation response
#[derive(Debug, Clone, Serialize)]
pub struct BatchTranslateResponse {
    pub total_requests: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

/// One language variant in a translations listing
#[derive(Debug, Clone, Serialize)]
pub struct TranslationInfo {
    pub asset_id: String,
    pub name: String,
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_asset_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// All language variants of an asset code
#[derive(Debug, Clone, Serialize)]
pub struct TranslationsListing {
    pub asset_code: String,
    pub available_languages: Vec<String>,
    pub translations: BTreeMap<String, TranslationInfo>,
}

/// Translate `content` for `asset_code` into the target language and store it
///
/// Fails with conflict if the (code, language) pair already exists and with
/// not found if there is no English original. Input is validated before any
/// store or AI call.
pub async fn translate(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    request: &TranslateRequest,
) -> ApiResult<Asset> {
    let target = validate_request(request)?;
    let code = request.asset_code.trim();

    if db::find_asset_by_code(pool, code, target.code()).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Translation already exists for asset '{}' in language '{}'",
            code, target
        )));
    }

    let source = db::find_asset_by_code(pool, code, SOURCE_LANGUAGE)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Source asset not found: '{}'", code)))?;

    let prompt = translation_prompt(&request.content, target);
    let translated = normalize_translation(&llm.generate(&prompt).await?);

    let asset = db::create_asset(
        pool,
        NewAsset {
            code: source.code.clone(),
            name: source.name.clone(),
            style: source.style.clone(),
            content: translated,
            language: target.code().to_string(),
            source_asset_id: Some(source.id.clone()),
        },
    )
    .await?;

    info!(
        asset_code = %asset.code,
        language = %asset.language,
        asset_id = %asset.id,
        "Translation created"
    );

    Ok(asset)
}

/// Run every request concurrently; one failure never affects the others
pub async fn translate_batch(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    requests: &[TranslateRequest],
) -> BatchTranslateResponse {
    let outcomes = join_all(requests.iter().map(|request| translate(pool, llm, request))).await;

    let results: Vec<BatchItemResult> = requests
        .iter()
        .zip(outcomes)
        .map(|(request, outcome)| {
            let (status, translation, error) = match outcome {
                Ok(asset) => (BatchStatus::Success, Some(asset), None),
                Err(e) => {
                    warn!(
                        asset_code = %request.asset_code,
                        language = %request.target_language,
                        "Batch translation item failed: {}",
                        e
                    );
                    (BatchStatus::Error, None, Some(e.message()))
                }
            };
            BatchItemResult {
                asset_code: request.asset_code.clone(),
                target_language: request.target_language.clone(),
                status,
                translation,
                error,
            }
        })
        .collect();

    let successful = results
        .iter()
        .filter(|r| r.status == BatchStatus::Success)
        .count();

    BatchTranslateResponse {
        total_requests: requests.len(),
        successful,
        failed: results.len() - successful,
        results,
    }
}

/// Every stored language variant of `asset_code`, original included
pub async fn get_translations(pool: &SqlitePool, asset_code: &str) -> ApiResult<TranslationsListing> {
    let assets = db::list_assets_by_code(pool, asset_code).await?;

    let translations: BTreeMap<String, TranslationInfo> = assets
        .into_iter()
        .map(|asset| {
            (
                asset.language,
                TranslationInfo {
                    asset_id: asset.id,
                    name: asset.name,
                    style: asset.style,
                    source_asset_id: asset.source_asset_id,
                    created_at: asset.created_at,
                },
            )
        })
        .collect();

    Ok(TranslationsListing {
        asset_code: asset_code.to_string(),
        available_languages: translations.keys().cloned().collect(),
        translations,
    })
}

/// The asset for `asset_code` in `language` (en, hi or te)
pub async fn get_asset_by_language(
    pool: &SqlitePool,
    asset_code: &str,
    language: &str,
) -> ApiResult<Asset> {
    let language: Language = language
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("language: {}", e)))?;

    db::find_asset_by_code(pool, asset_code, language.code())
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Asset '{}' not found in language '{}'",
                asset_code, language
            ))
        })
}

fn validate_request(request: &TranslateRequest) -> ApiResult<Language> {
    let target: Language = request
        .target_language
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("target_language: {}", e)))?;

    if !target.is_translation_target() {
        return Err(ApiError::BadRequest(format!(
            "target_language: must be one of hi, te (got '{}')",
            target
        )));
    }
    if request.asset_code.trim().is_empty() {
        return Err(ApiError::BadRequest("asset_code: must not be empty".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content: must not be empty".to_string()));
    }
    Ok(target)
}

fn translation_prompt(content: &str, target: Language) -> String {
    let language = target.display_name();
    format!(
        "You are an expert educational content creator and translator. Translate educational \
         materials while keeping their instructional value and clarity.\n\
         \n\
         TASK: Translate the following educational content from English to {language}.\n\
         \n\
         GUIDELINES:\n\
         1. Keep the educational structure and flow\n\
         2. Translate technical terms and concepts accurately\n\
         3. Use appropriate educational terminology in {language}\n\
         4. Keep the same HTML structure and formatting\n\
         5. Make the translation natural and easy for students to follow\n\
         6. Keep the same level of formality and tone\n\
         7. Do not add extra newlines or line breaks\n\
         \n\
         CONTENT TO TRANSLATE:\n\
         {content}\n\
         \n\
         Return ONLY the translated content in {language}, with no explanations or notes.\n\
         \n\
         TRANSLATED CONTENT:"
    )
}

/// Trim, drop blank lines and trim each remaining line
pub fn normalize_translation(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: &str, language: &str, content: &str) -> TranslateRequest {
        TranslateRequest {
            asset_code: code.to_string(),
            target_language: language.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_normalize_collapses_blank_lines() {
        let raw = "\n  <h1>शीर्षक</h1>  \n\n   \n<p>पाठ</p>\n\n";
        assert_eq!(normalize_translation(raw), "<h1>शीर्षक</h1>\n<p>पाठ</p>");
    }

    #[test]
    fn test_validation_rejects_unsupported_targets() {
        assert!(matches!(
            validate_request(&request("C1", "fr", "<p>x</p>")),
            Err(ApiError::BadRequest(_))
        ));
        // English is the source language, not a target
        assert!(matches!(
            validate_request(&request("C1", "en", "<p>x</p>")),
            Err(ApiError::BadRequest(_))
        ));
        assert_eq!(
            validate_request(&request("C1", "te", "<p>x</p>")).unwrap(),
            Language::Telugu
        );
    }

    #[test]
    fn test_validation_rejects_blank_fields() {
        let err = validate_request(&request("C1", "hi", "   ")).unwrap_err();
        assert!(err.message().starts_with("content"));

        let err = validate_request(&request("", "hi", "<p>x</p>")).unwrap_err();
        assert!(err.message().starts_with("asset_code"));
    }

    #[test]
    fn test_prompt_names_language_and_embeds_content() {
        let prompt = translation_prompt("<h1>AI</h1>", Language::Hindi);
        assert!(prompt.contains("from English to Hindi"));
        assert!(prompt.contains("<h1>AI</h1>"));
    }
}
