//! Quiz generation for course modules
//!
//! Each module's English assets are concatenated into one prompt; the
//! model answers with a JSON quiz which is validated before it is stored.
//! Modules are processed in order and one module's failure never stops
//! the others.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{Difficulty, NewQuiz, PopulatedModule, Quiz, QuizQuestion};
use crate::services::course;
use crate::services::llm::TextGenerator;

const NUM_QUESTIONS_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
const OPTIONS_RANGE: std::ops::RangeInclusive<usize> = 2..=6;
const OPTIONS_PER_QUESTION: usize = 4;

/// Quiz generation request; all modules unless `module_index` is set
#[derive(Debug, Clone, Deserialize)]
pub struct QuizGenerationRequest {
    pub course_id: String,
    #[serde(default)]
    pub module_index: Option<usize>,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Replace quizzes that already exist instead of skipping their modules
    #[serde(default)]
    pub overwrite: bool,
}

fn default_num_questions() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizGenerationResponse {
    pub success: bool,
    pub message: String,
    pub generated_quizzes: Vec<Quiz>,
    /// Indices of modules that already had a quiz
    pub skipped_modules: Vec<usize>,
    pub errors: Vec<String>,
}

/// Shape the model is asked to answer with
#[derive(Debug, Deserialize)]
struct GeneratedQuiz {
    #[serde(default)]
    title: String,
    questions: Vec<QuizQuestion>,
}

/// Generate and store quizzes for one or all modules of a course
///
/// Course-level problems (unknown course or module, dangling asset
/// reference, invalid parameters, AI not configured) fail the request.
/// Per-module problems are reported in `errors`.
pub async fn generate_quizzes(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    request: &QuizGenerationRequest,
) -> ApiResult<QuizGenerationResponse> {
    if !NUM_QUESTIONS_RANGE.contains(&request.num_questions) {
        return Err(ApiError::BadRequest(format!(
            "num_questions: must be between {} and {} (got {})",
            NUM_QUESTIONS_RANGE.start(),
            NUM_QUESTIONS_RANGE.end(),
            request.num_questions
        )));
    }
    let difficulty: Difficulty = request
        .difficulty
        .as_deref()
        .unwrap_or("medium")
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("difficulty: {}", e)))?;
    if !llm.is_configured() {
        return Err(ApiError::AiNotConfigured);
    }

    let course = course::get_course_with_assets(pool, &request.course_id).await?;

    let targets: Vec<usize> = match request.module_index {
        Some(index) if index < course.modules.len() => vec![index],
        Some(index) => {
            return Err(ApiError::NotFound(format!(
                "Module {} not found in course {}",
                index, course.id
            )))
        }
        None => (0..course.modules.len()).collect(),
    };

    let mut generated = Vec::new();
    let mut skipped = Vec::new();
    let mut errors = Vec::new();

    for index in targets {
        let module = &course.modules[index];

        let existing = db::find_module_quiz(pool, &course.id, index).await?;
        if existing.is_some() && !request.overwrite {
            skipped.push(index);
            continue;
        }

        let content = module_content(module);
        if content.is_empty() {
            errors.push(format!("Module {} has no asset content", index));
            continue;
        }

        let module_title = module_title(module, index);
        let prompt = quiz_prompt(&module_title, &content, request.num_questions, difficulty);

        let parsed = match llm.generate(&prompt).await {
            Ok(reply) => parse_quiz(&reply),
            Err(e) => Err(e.to_string()),
        };
        let quiz = match parsed {
            Ok(quiz) => quiz,
            Err(e) => {
                warn!(course_id = %course.id, module_index = index, "Quiz generation failed: {}", e);
                errors.push(format!("Module {}: {}", index, e));
                continue;
            }
        };

        if existing.is_some() {
            db::delete_module_quiz(pool, &course.id, index).await?;
        }

        let title = if quiz.title.trim().is_empty() {
            format!("Quiz: {}", module_title)
        } else {
            quiz.title.trim().to_string()
        };
        let stored = db::create_quiz(
            pool,
            NewQuiz {
                course_id: course.id.clone(),
                module_index: index,
                module_code: module.code.clone(),
                title,
                difficulty,
                questions: quiz.questions,
            },
        )
        .await?;
        generated.push(stored);
    }

    info!(
        course_id = %course.id,
        generated = generated.len(),
        skipped = skipped.len(),
        failed = errors.len(),
        "Quiz generation finished"
    );

    Ok(summarize_outcome(generated, skipped, errors))
}

/// Every stored quiz of a course, in module order
pub async fn course_quizzes(pool: &SqlitePool, course_id: &str) -> ApiResult<Vec<Quiz>> {
    Ok(db::list_course_quizzes(pool, course_id).await?)
}

fn summarize_outcome(
    generated: Vec<Quiz>,
    skipped: Vec<usize>,
    errors: Vec<String>,
) -> QuizGenerationResponse {
    let (success, message) = match (generated.len(), skipped.len()) {
        (0, 0) => (false, "No quizzes were generated".to_string()),
        (0, s) => (
            errors.is_empty(),
            format!("Skipped {} existing quizzes. Use overwrite=true to regenerate.", s),
        ),
        (g, 0) => (errors.is_empty(), format!("Generated {} quizzes", g)),
        (g, s) => (
            errors.is_empty(),
            format!("Generated {} quizzes, skipped {} existing quizzes", g, s),
        ),
    };

    QuizGenerationResponse {
        success,
        message,
        generated_quizzes: generated,
        skipped_modules: skipped,
        errors,
    }
}

/// Module assets as `Asset: <name>` blocks; blank assets are left out
fn module_content(module: &PopulatedModule) -> String {
    module
        .assets
        .iter()
        .filter(|asset| !asset.content.trim().is_empty())
        .map(|asset| format!("Asset: {}\n{}", asset.name, asset.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn module_title(module: &PopulatedModule, index: usize) -> String {
    match &module.code {
        Some(code) => format!("Module {}", code),
        None => format!("Module {}", index + 1),
    }
}

/// Parse the model's JSON reply, tolerating a markdown code fence
fn parse_quiz(reply: &str) -> Result<GeneratedQuiz, String> {
    let text = reply.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .map(|t| t.trim_end().trim_end_matches("```").trim())
        .unwrap_or(text);

    let quiz: GeneratedQuiz =
        serde_json::from_str(text).map_err(|e| format!("unreadable quiz JSON: {}", e))?;

    if quiz.questions.is_empty() {
        return Err("quiz has no questions".to_string());
    }
    for (i, question) in quiz.questions.iter().enumerate() {
        if question.question.trim().is_empty() {
            return Err(format!("question {} has no text", i + 1));
        }
        if !OPTIONS_RANGE.contains(&question.options.len()) {
            return Err(format!(
                "question {} has {} options (expected {} to {})",
                i + 1,
                question.options.len(),
                OPTIONS_RANGE.start(),
                OPTIONS_RANGE.end()
            ));
        }
        if question.correct_answer >= question.options.len() {
            return Err(format!("question {} has an out-of-range correct_answer", i + 1));
        }
    }
    Ok(quiz)
}

fn quiz_prompt(title: &str, content: &str, num_questions: u32, difficulty: Difficulty) -> String {
    format!(
        "Based on the following content, create a multiple choice quiz with {n} questions.\n\
         \n\
         Module: {title}\n\
         \n\
         Content:\n\
         {content}\n\
         \n\
         Requirements:\n\
         - Create {n} multiple choice questions\n\
         - Each question should have {options} options\n\
         - Include the correct answer index (0-based)\n\
         - Add brief explanations for correct answers\n\
         - Difficulty level: {difficulty}\n\
         \n\
         Return ONLY valid JSON in exactly this format, with no markdown or extra text:\n\
         {{\"title\": \"Quiz title\", \"questions\": [{{\"question\": \"Question text?\", \
         \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correct_answer\": 0, \
         \"explanation\": \"Why this is correct\"}}]}}",
        n = num_questions,
        title = title,
        content = content,
        options = OPTIONS_PER_QUESTION,
        difficulty = difficulty.as_str(),
    )
}
