//! Style variants of asset content
//!
//! Rewrites content as a story, visual cues or a summary framed around a
//! learner's domain and hobby. `original` variants store the content as-is
//! without calling the model.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{AssetVariant, NewAssetVariant, TransformStyle, SOURCE_LANGUAGE};
use crate::services::llm::TextGenerator;

const MIN_CONTENT_CHARS: usize = 10;
const MIN_CONTEXT_CHARS: usize = 2;

/// Transform request: rewrite `content` in `style`
#[derive(Debug, Clone, Deserialize)]
pub struct TransformRequest {
    pub asset_code: String,
    pub style: String,
    pub content: String,
    pub domain: String,
    pub hobby: String,
}

/// Lookup key for a stored variant
#[derive(Debug, Clone, Deserialize)]
pub struct VariantQuery {
    pub code: String,
    pub style: String,
    pub domain: String,
    pub hobby: String,
}

/// How a looked-up variant was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Already stored for the exact key
    Exact,
    /// The original asset, returned as-is
    Original,
    /// Generated from the original asset and stored
    Generated,
}

/// Result of a get-or-generate lookup
#[derive(Debug, Clone, Serialize)]
pub struct VariantLookup {
    pub match_type: MatchType,
    pub variant: AssetVariant,
}

/// Rewrite the request content and store it under its key
pub async fn transform(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    request: &TransformRequest,
) -> ApiResult<AssetVariant> {
    let style = parse_style(&request.style)?;
    validate_field("asset_code", &request.asset_code, 1)?;
    validate_field("content", &request.content, MIN_CONTENT_CHARS)?;
    validate_field("domain", &request.domain, MIN_CONTEXT_CHARS)?;
    validate_field("hobby", &request.hobby, MIN_CONTEXT_CHARS)?;

    let content = render(llm, style, &request.content, &request.domain, &request.hobby).await?;

    let variant = db::upsert_variant(
        pool,
        NewAssetVariant {
            asset_code: request.asset_code.trim().to_string(),
            style,
            domain: request.domain.trim().to_string(),
            hobby: request.hobby.trim().to_string(),
            content,
        },
    )
    .await?;

    info!(
        asset_code = %variant.asset_code,
        style = %variant.style,
        domain = %variant.domain,
        hobby = %variant.hobby,
        "Asset variant stored"
    );

    Ok(variant)
}

/// Return the stored variant for the key, or build it from the English
/// original of `code`
///
/// Fails with not found when neither a stored variant nor an original
/// exists. Stored matches never call the model.
pub async fn get_or_generate(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    query: &VariantQuery,
) -> ApiResult<VariantLookup> {
    let style = parse_style(&query.style)?;
    validate_field("code", &query.code, 1)?;
    validate_field("domain", &query.domain, MIN_CONTEXT_CHARS)?;
    validate_field("hobby", &query.hobby, MIN_CONTEXT_CHARS)?;

    let code = query.code.trim();
    let domain = query.domain.trim();
    let hobby = query.hobby.trim();

    if let Some(variant) = db::find_variant(pool, code, style.as_str(), domain, hobby).await? {
        return Ok(VariantLookup {
            match_type: MatchType::Exact,
            variant,
        });
    }

    let original = db::find_asset_by_code(pool, code, SOURCE_LANGUAGE)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No variant or original asset found for code '{}'",
                code
            ))
        })?;

    let content = render(llm, style, &original.content, domain, hobby).await?;
    let variant = db::upsert_variant(
        pool,
        NewAssetVariant {
            asset_code: code.to_string(),
            style,
            domain: domain.to_string(),
            hobby: hobby.to_string(),
            content,
        },
    )
    .await?;

    let match_type = if style == TransformStyle::Original {
        MatchType::Original
    } else {
        MatchType::Generated
    };
    info!(asset_code = %code, style = %style, ?match_type, "Asset variant resolved");

    Ok(VariantLookup {
        match_type,
        variant,
    })
}

/// Every stored variant of `asset_code`
pub async fn list_variants(pool: &SqlitePool, asset_code: &str) -> ApiResult<Vec<AssetVariant>> {
    Ok(db::list_variants(pool, asset_code).await?)
}

async fn render(
    llm: &dyn TextGenerator,
    style: TransformStyle,
    content: &str,
    domain: &str,
    hobby: &str,
) -> ApiResult<String> {
    if style == TransformStyle::Original {
        return Ok(content.to_string());
    }
    let reply = llm.generate(&transform_prompt(style, content, domain, hobby)).await?;
    Ok(clean_output(&reply))
}

fn parse_style(value: &str) -> ApiResult<TransformStyle> {
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("style: {}", e)))
}

fn validate_field(field: &str, value: &str, min_chars: usize) -> ApiResult<()> {
    if value.trim().chars().count() < min_chars {
        let rule = if min_chars == 1 {
            "must not be empty".to_string()
        } else {
            format!("must be at least {} characters", min_chars)
        };
        return Err(ApiError::BadRequest(format!("{}: {}", field, rule)));
    }
    Ok(())
}

/// Trim and drop one pair of wrapping double quotes
fn clean_output(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

fn style_instructions(style: TransformStyle) -> &'static str {
    match style {
        TransformStyle::Storytelling => {
            "- Convert the content into a short storytelling analogy.\n\
             - Make it relevant to the given domain and hobby.\n\
             - Use simple, engaging language.\n\
             - Build a narrative that explains the concept through a relatable story."
        }
        TransformStyle::VisualCue => {
            "- Convert the content into simple symbolic visual cues (emoji flows, ASCII \
             diagrams, metaphors).\n\
             - Give 3-4 different cues for the same concept.\n\
             - Connect each cue to the domain and hobby.\n\
             - Use emojis, arrows or short symbolic flows instead of long text.\n\
             Format each cue on its own line as: VISUAL CUE N: [flow or diagram]"
        }
        TransformStyle::Summary => {
            "- Write a concise summary of the content.\n\
             - Frame it in the context of the domain and hobby.\n\
             - Use analogies from the hobby to explain domain concepts."
        }
        TransformStyle::Original => "- Return the content unchanged.",
    }
}

fn transform_prompt(style: TransformStyle, content: &str, domain: &str, hobby: &str) -> String {
    format!(
        "You are an AI content transformer for learners. Rewrite the content below in the \
         {style} style.\n\
         \n\
         {instructions}\n\
         \n\
         Example (content: \"Neural networks learn patterns from data.\", domain: Business, \
         hobby: Cricket):\n\
         \"Imagine a cricket coach who studies thousands of player stats to pick the best \
         batting order. That is how neural networks learn patterns to make predictions.\"\n\
         \n\
         Style: {style}\n\
         Domain: {domain}\n\
         Hobby: {hobby}\n\
         Content: \"{content}\"\n\
         \n\
         Return ONLY the {style} output, without labels or extra formatting.",
        style = style,
        instructions = style_instructions(style),
        domain = domain,
        hobby = hobby,
        content = content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_output_strips_wrapping_quotes_once() {
        assert_eq!(clean_output("  \"A coach studies stats.\"\n"), "A coach studies stats.");
        assert_eq!(clean_output("\"\"nested\"\""), "\"nested\"");
        assert_eq!(clean_output("no quotes"), "no quotes");
        assert_eq!(clean_output("\"unbalanced"), "\"unbalanced");
    }

    #[test]
    fn test_field_validation_names_field() {
        let err = validate_field("hobby", " x ", MIN_CONTEXT_CHARS).unwrap_err();
        assert_eq!(err.message(), "hobby: must be at least 2 characters");

        let err = validate_field("asset_code", "  ", 1).unwrap_err();
        assert_eq!(err.message(), "asset_code: must not be empty");

        assert!(validate_field("content", "Gradient descent", MIN_CONTENT_CHARS).is_ok());
    }

    #[test]
    fn test_prompt_carries_style_and_context() {
        let prompt = transform_prompt(TransformStyle::VisualCue, "Recursion", "Engineering", "Music");
        assert!(prompt.contains("in the visual_cue style"));
        assert!(prompt.contains("VISUAL CUE N"));
        assert!(prompt.contains("Domain: Engineering"));
        assert!(prompt.contains("Hobby: Music"));
        assert!(prompt.contains("Content: \"Recursion\""));
    }

    #[test]
    fn test_unknown_style_is_bad_request() {
        assert!(matches!(parse_style("meme"), Err(ApiError::BadRequest(_))));
    }
}
