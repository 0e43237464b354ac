//! Text summarization, key points and sentiment
//!
//! Stateless: every operation validates its input, sends one prompt and
//! returns the model's text as-is along with word counts.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::llm::TextGenerator;

const SERVICE_NAME: &str = "text-summarization";

const MIN_TEXT_CHARS: usize = 10;
const MIN_SENTIMENT_CHARS: usize = 5;
const MAX_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 10..=1000;
const NUM_POINTS_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// Summary presentation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    Concise,
    Detailed,
    BulletPoints,
}

impl SummaryStyle {
    fn parse(value: Option<&str>) -> ApiResult<Self> {
        match value.unwrap_or("concise") {
            "concise" => Ok(SummaryStyle::Concise),
            "detailed" => Ok(SummaryStyle::Detailed),
            "bullet_points" => Ok(SummaryStyle::BulletPoints),
            other => Err(ApiError::BadRequest(format!(
                "style: must be one of concise, detailed, bullet_points (got '{}')",
                other
            ))),
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            SummaryStyle::Concise => "Provide a concise summary that captures the main points.",
            SummaryStyle::Detailed => {
                "Provide a detailed summary that includes key points and supporting details."
            }
            SummaryStyle::BulletPoints => {
                "Provide a summary in bullet point format, highlighting the main ideas."
            }
        }
    }
}

// ============================================================================
// Requests / responses
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub word_count: usize,
    pub original_word_count: usize,
    pub compression_ratio: f64,
    pub style: SummaryStyle,
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyPointsRequest {
    pub text: String,
    #[serde(default = "default_num_points")]
    pub num_points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyPointsResponse {
    pub key_points: String,
    pub num_points: u32,
    pub word_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentResponse {
    pub sentiment: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    #[serde(default = "default_true")]
    pub include_summary: bool,
    #[serde(default = "default_true")]
    pub include_key_points: bool,
    #[serde(default = "default_true")]
    pub include_sentiment: bool,
    #[serde(default)]
    pub summary_style: Option<String>,
    #[serde(default)]
    pub max_summary_length: Option<u32>,
    #[serde(default = "default_num_points")]
    pub num_key_points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub sections: Vec<&'static str>,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryHealth {
    pub status: &'static str,
    pub ai_configured: bool,
    pub model: String,
    pub service: &'static str,
    pub version: &'static str,
}

fn default_num_points() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Operations
// ============================================================================

pub async fn summarize(
    llm: &dyn TextGenerator,
    request: &SummarizeRequest,
) -> ApiResult<SummarizeResponse> {
    validate_text(&request.text, MIN_TEXT_CHARS)?;
    validate_range("max_length", request.max_length, &MAX_LENGTH_RANGE)?;
    let style = SummaryStyle::parse(request.style.as_deref())?;
    ensure_configured(llm)?;

    let prompt = summarize_prompt(&request.text, request.max_length, style);
    let summary = llm.generate(&prompt).await?;

    let summary_words = word_count(&summary);
    let original_word_count = word_count(&request.text);

    tracing::debug!(original_word_count, summary_words, ?style, "Summary generated");

    Ok(SummarizeResponse {
        compression_ratio: compression_ratio(original_word_count, summary_words),
        summary,
        word_count: summary_words,
        original_word_count,
        style,
        max_length: request.max_length,
    })
}

pub async fn extract_key_points(
    llm: &dyn TextGenerator,
    request: &KeyPointsRequest,
) -> ApiResult<KeyPointsResponse> {
    validate_text(&request.text, MIN_TEXT_CHARS)?;
    validate_range("num_points", Some(request.num_points), &NUM_POINTS_RANGE)?;
    ensure_configured(llm)?;

    let key_points = llm
        .generate(&key_points_prompt(&request.text, request.num_points))
        .await?;

    Ok(KeyPointsResponse {
        key_points,
        num_points: request.num_points,
        word_count: word_count(&request.text),
    })
}

pub async fn analyze_sentiment(
    llm: &dyn TextGenerator,
    request: &SentimentRequest,
) -> ApiResult<SentimentResponse> {
    validate_text(&request.text, MIN_SENTIMENT_CHARS)?;
    ensure_configured(llm)?;

    let sentiment = llm.generate(&sentiment_prompt(&request.text)).await?;

    Ok(SentimentResponse {
        sentiment,
        word_count: word_count(&request.text),
    })
}

/// Every requested section in one combined prompt
pub async fn full_analysis(
    llm: &dyn TextGenerator,
    request: &AnalysisRequest,
) -> ApiResult<AnalysisResponse> {
    validate_text(&request.text, MIN_TEXT_CHARS)?;
    if !(request.include_summary || request.include_key_points || request.include_sentiment) {
        return Err(ApiError::BadRequest(
            "include_summary, include_key_points, include_sentiment: at least one must be true"
                .to_string(),
        ));
    }
    validate_range("max_summary_length", request.max_summary_length, &MAX_LENGTH_RANGE)?;
    validate_range("num_key_points", Some(request.num_key_points), &NUM_POINTS_RANGE)?;
    let style = SummaryStyle::parse(request.summary_style.as_deref())?;
    ensure_configured(llm)?;

    let (prompt, sections) = analysis_prompt(request, style);
    let analysis = llm.generate(&prompt).await?;

    Ok(AnalysisResponse {
        analysis,
        sections,
        word_count: word_count(&request.text),
    })
}

/// AI integration status; never calls upstream
pub fn health(llm: &dyn TextGenerator) -> SummaryHealth {
    let ai_configured = llm.is_configured();
    SummaryHealth {
        status: if ai_configured { "healthy" } else { "unhealthy" },
        ai_configured,
        model: llm.model().to_string(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn ensure_configured(llm: &dyn TextGenerator) -> ApiResult<()> {
    if llm.is_configured() {
        Ok(())
    } else {
        Err(ApiError::AiNotConfigured)
    }
}

fn validate_text(text: &str, min_chars: usize) -> ApiResult<()> {
    if text.trim().chars().count() < min_chars {
        return Err(ApiError::BadRequest(format!(
            "text: must be at least {} characters",
            min_chars
        )));
    }
    Ok(())
}

fn validate_range(
    field: &str,
    value: Option<u32>,
    range: &std::ops::RangeInclusive<u32>,
) -> ApiResult<()> {
    match value {
        Some(v) if !range.contains(&v) => Err(ApiError::BadRequest(format!(
            "{}: must be between {} and {} (got {})",
            field,
            range.start(),
            range.end(),
            v
        ))),
        _ => Ok(()),
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// original / summary, rounded to 2 decimals; 0 for an empty summary
pub fn compression_ratio(original_words: usize, summary_words: usize) -> f64 {
    if summary_words == 0 {
        return 0.0;
    }
    let ratio = original_words as f64 / summary_words as f64;
    (ratio * 100.0).round() / 100.0
}

fn summarize_prompt(text: &str, max_length: Option<u32>, style: SummaryStyle) -> String {
    let mut prompt = format!(
        "Please summarize the following text:\n\n{}\n\n{}",
        text,
        style.instruction()
    );
    if let Some(max) = max_length {
        prompt.push_str(&format!(" Keep the summary under {} words.", max));
    }
    prompt
}

fn key_points_prompt(text: &str, num_points: u32) -> String {
    format!(
        "Extract the {n} most important key points from the following text:\n\n\
         {text}\n\n\
         Format each key point as a clear, concise statement. Number them 1-{n}.",
        n = num_points,
        text = text
    )
}

fn sentiment_prompt(text: &str) -> String {
    format!(
        "Analyze the sentiment of the following text and provide:\n\
         1. Overall sentiment (positive, negative, neutral)\n\
         2. Confidence level (0-100%)\n\
         3. Brief explanation\n\n\
         Text: {}\n\n\
         Format your response as:\n\
         Sentiment: [positive/negative/neutral]\n\
         Confidence: [percentage]\n\
         Explanation: [brief explanation]",
        text
    )
}

fn analysis_prompt(request: &AnalysisRequest, style: SummaryStyle) -> (String, Vec<&'static str>) {
    let mut sections = Vec::new();
    let mut tasks = Vec::new();

    if request.include_summary {
        let mut task = format!("SUMMARY: {}", style.instruction());
        if let Some(max) = request.max_summary_length {
            task.push_str(&format!(" Keep the summary under {} words.", max));
        }
        tasks.push(task);
        sections.push("summary");
    }
    if request.include_key_points {
        tasks.push(format!(
            "KEY POINTS: List the {n} most important key points, numbered 1-{n}.",
            n = request.num_key_points
        ));
        sections.push("key_points");
    }
    if request.include_sentiment {
        tasks.push(
            "SENTIMENT: State the overall sentiment (positive, negative, neutral), a \
             confidence level (0-100%) and a brief explanation."
                .to_string(),
        );
        sections.push("sentiment");
    }

    let numbered: Vec<String> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {}", i + 1, task))
        .collect();

    let prompt = format!(
        "Analyze the following text and provide each section below under its own heading.\n\n\
         {}\n\n\
         Text:\n{}",
        numbered.join("\n"),
        request.text
    );

    (prompt, sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_request() -> AnalysisRequest {
        AnalysisRequest {
            text: "Rust is a systems programming language.".to_string(),
            include_summary: true,
            include_key_points: true,
            include_sentiment: true,
            summary_style: None,
            max_summary_length: None,
            num_key_points: 5,
        }
    }

    #[test]
    fn test_compression_ratio_rounding() {
        assert_eq!(compression_ratio(100, 30), 3.33);
        assert_eq!(compression_ratio(10, 10), 1.0);
        assert_eq!(compression_ratio(10, 0), 0.0);
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!(SummaryStyle::parse(None).unwrap(), SummaryStyle::Concise);
        assert_eq!(
            SummaryStyle::parse(Some("bullet_points")).unwrap(),
            SummaryStyle::BulletPoints
        );
        assert!(SummaryStyle::parse(Some("poetic")).is_err());
    }

    #[test]
    fn test_text_length_is_counted_after_trim() {
        assert!(validate_text("   short   ", MIN_TEXT_CHARS).is_err());
        assert!(validate_text("long enough text", MIN_TEXT_CHARS).is_ok());
        assert!(validate_text("great", MIN_SENTIMENT_CHARS).is_ok());
    }

    #[test]
    fn test_range_validation_names_field() {
        let err = validate_range("max_length", Some(5), &MAX_LENGTH_RANGE).unwrap_err();
        assert!(err.message().starts_with("max_length"));
        assert!(validate_range("max_length", None, &MAX_LENGTH_RANGE).is_ok());
        assert!(validate_range("num_points", Some(20), &NUM_POINTS_RANGE).is_ok());
    }

    #[test]
    fn test_summarize_prompt_includes_length_limit() {
        let prompt = summarize_prompt("Some text here", Some(50), SummaryStyle::Detailed);
        assert!(prompt.contains("Some text here"));
        assert!(prompt.contains("detailed summary"));
        assert!(prompt.ends_with("Keep the summary under 50 words."));
    }

    #[test]
    fn test_analysis_prompt_lists_only_included_sections() {
        let mut request = analysis_request();
        request.include_key_points = false;

        let (prompt, sections) = analysis_prompt(&request, SummaryStyle::Concise);

        assert_eq!(sections, vec!["summary", "sentiment"]);
        assert!(prompt.contains("1. SUMMARY"));
        assert!(prompt.contains("2. SENTIMENT"));
        assert!(!prompt.contains("KEY POINTS"));
    }
}
