//! Content documents: assets, courses, style variants, quizzes and their
//! request/response shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language every original asset is authored in
pub const SOURCE_LANGUAGE: &str = "en";

/// Languages the service knows how to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "te")]
    Telugu,
}

impl Language {
    /// ISO 639-1 code as stored on assets
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Telugu => "te",
        }
    }

    /// Name used inside translation prompts
    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
        }
    }

    /// Whether the translation flow may target this language
    pub fn is_translation_target(self) -> bool {
        !matches!(self, Language::English)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::English),
            "hi" => Ok(Language::Hindi),
            "te" => Ok(Language::Telugu),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

// ============================================================================
// Assets
// ============================================================================

/// Stored content document
///
/// Originals carry `language = "en"` and no `source_asset_id`; translation
/// records carry another language and point back at their original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub code: String,
    pub name: String,
    pub style: String,
    pub content: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn is_translation(&self) -> bool {
        self.source_asset_id.is_some()
    }
}

/// Fields for creating an asset
#[derive(Debug, Clone, Deserialize)]
pub struct NewAsset {
    pub code: String,
    pub name: String,
    #[serde(default = "default_style")]
    pub style: String,
    pub content: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub source_asset_id: Option<String>,
}

/// Partial asset update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub style: Option<String>,
    pub content: Option<String>,
}

impl AssetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.style.is_none() && self.content.is_none()
    }
}

fn default_style() -> String {
    "original".to_string()
}

fn default_language() -> String {
    SOURCE_LANGUAGE.to_string()
}

// ============================================================================
// Courses
// ============================================================================

/// Course module referencing assets by code, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "type", default = "default_module_type")]
    pub module_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub assets: Vec<String>,
}

fn default_module_type() -> String {
    "module".to_string()
}

/// Stored course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub modules: Vec<Module>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a course
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub name: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// Partial course update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub modules: Option<Vec<Module>>,
}

impl CourseUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.modules.is_none()
    }
}

/// Module with its asset references replaced by the documents
#[derive(Debug, Clone, Serialize)]
pub struct PopulatedModule {
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub assets: Vec<Asset>,
}

/// Course view with every module populated
#[derive(Debug, Clone, Serialize)]
pub struct PopulatedCourse {
    pub id: String,
    pub name: String,
    pub modules: Vec<PopulatedModule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Style variants
// ============================================================================

/// Presentation style an asset can be rewritten into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStyle {
    Storytelling,
    VisualCue,
    Summary,
    /// The content as authored; never sent to the model
    Original,
}

impl TransformStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformStyle::Storytelling => "storytelling",
            TransformStyle::VisualCue => "visual_cue",
            TransformStyle::Summary => "summary",
            TransformStyle::Original => "original",
        }
    }
}

impl fmt::Display for TransformStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "storytelling" => Ok(TransformStyle::Storytelling),
            "visual_cue" => Ok(TransformStyle::VisualCue),
            "summary" => Ok(TransformStyle::Summary),
            "original" => Ok(TransformStyle::Original),
            other => Err(format!(
                "must be one of storytelling, visual_cue, summary, original (got '{}')",
                other
            )),
        }
    }
}

/// Asset content rewritten for a learner's domain and hobby
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetVariant {
    pub id: String,
    pub asset_code: String,
    pub style: String,
    pub domain: String,
    pub hobby: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAssetVariant {
    pub asset_code: String,
    pub style: TransformStyle,
    pub domain: String,
    pub hobby: String,
    pub content: String,
}

// ============================================================================
// Quizzes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("must be one of easy, medium, hard (got '{}')", other)),
        }
    }
}

/// Multiple-choice question; `correct_answer` indexes into `options`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Quiz generated for one course module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub course_id: String,
    pub module_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_code: Option<String>,
    pub title: String,
    pub difficulty: String,
    pub questions: Vec<QuizQuestion>,
    pub total_questions: usize,
    pub estimated_time_minutes: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub course_id: String,
    pub module_index: usize,
    pub module_code: Option<String>,
    pub title: String,
    pub difficulty: Difficulty,
    pub questions: Vec<QuizQuestion>,
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 1000;

    /// (offset, limit) with negative skip floored and limit clamped to 1..=1000
    pub fn bounds(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, Self::MAX_LIMIT))
    }
}

fn default_limit() -> i64 {
    100
}
