//! Quiz persistence
//!
//! At most one quiz per (course, module index). Questions are stored as a
//! JSON array on the quiz row.

use alp_common::{Error, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::{NewQuiz, Quiz, QuizQuestion};

const QUIZ_COLUMNS: &str = "id, course_id, module_index, module_code, title, difficulty, \
                            questions, estimated_time_minutes, created_at";

/// Two minutes per question
const MINUTES_PER_QUESTION: u32 = 2;

fn quiz_from_row(row: &SqliteRow) -> Result<Quiz> {
    let id: String = row.try_get("id")?;
    let questions_json: String = row.try_get("questions")?;
    let questions: Vec<QuizQuestion> = serde_json::from_str(&questions_json)
        .map_err(|e| Error::Internal(format!("Quiz {} has unreadable questions: {}", id, e)))?;
    let module_index: i64 = row.try_get("module_index")?;
    let minutes: i64 = row.try_get("estimated_time_minutes")?;

    Ok(Quiz {
        module_index: usize::try_from(module_index)
            .map_err(|_| Error::Internal(format!("Quiz {} has negative module index", id)))?,
        course_id: row.try_get("course_id")?,
        module_code: row.try_get("module_code")?,
        title: row.try_get("title")?,
        difficulty: row.try_get("difficulty")?,
        total_questions: questions.len(),
        questions,
        estimated_time_minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
        created_at: row.try_get("created_at")?,
        id,
    })
}

/// Insert a quiz; a second quiz for the same module is a conflict
pub async fn create_quiz(pool: &SqlitePool, new: NewQuiz) -> Result<Quiz> {
    let questions_json = serde_json::to_string(&new.questions)
        .map_err(|e| Error::Internal(format!("Failed to encode questions: {}", e)))?;
    let minutes = MINUTES_PER_QUESTION.saturating_mul(new.questions.len() as u32);

    let quiz = Quiz {
        id: Uuid::new_v4().to_string(),
        course_id: new.course_id,
        module_index: new.module_index,
        module_code: new.module_code,
        title: new.title,
        difficulty: new.difficulty.as_str().to_string(),
        total_questions: new.questions.len(),
        questions: new.questions,
        estimated_time_minutes: minutes,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO quizzes (
            id, course_id, module_index, module_code, title, difficulty,
            questions, estimated_time_minutes, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&quiz.id)
    .bind(&quiz.course_id)
    .bind(quiz.module_index as i64)
    .bind(&quiz.module_code)
    .bind(&quiz.title)
    .bind(&quiz.difficulty)
    .bind(questions_json)
    .bind(i64::from(quiz.estimated_time_minutes))
    .bind(quiz.created_at)
    .execute(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Error::Conflict(format!(
            "Quiz already exists for module {} of course {}",
            quiz.module_index, quiz.course_id
        )),
        _ => Error::Database(e),
    })?;

    tracing::debug!(
        quiz_id = %quiz.id,
        course_id = %quiz.course_id,
        module_index = quiz.module_index,
        questions = quiz.total_questions,
        "Quiz created"
    );

    Ok(quiz)
}

/// Load quiz by id
pub async fn get_quiz(pool: &SqlitePool, id: &str) -> Result<Option<Quiz>> {
    let sql = format!("SELECT {} FROM quizzes WHERE id = ?", QUIZ_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(quiz_from_row).transpose()
}

/// The quiz stored for one module of a course
pub async fn find_module_quiz(
    pool: &SqlitePool,
    course_id: &str,
    module_index: usize,
) -> Result<Option<Quiz>> {
    let sql = format!(
        "SELECT {} FROM quizzes WHERE course_id = ? AND module_index = ?",
        QUIZ_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(course_id)
        .bind(module_index as i64)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(quiz_from_row).transpose()
}

/// Every quiz of a course in module order
pub async fn list_course_quizzes(pool: &SqlitePool, course_id: &str) -> Result<Vec<Quiz>> {
    let sql = format!(
        "SELECT {} FROM quizzes WHERE course_id = ? ORDER BY module_index ASC",
        QUIZ_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(course_id).fetch_all(pool).await?;
    rows.iter().map(quiz_from_row).collect()
}

/// Delete quiz by id
pub async fn delete_quiz(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete the quiz of one module, if any
pub async fn delete_module_quiz(
    pool: &SqlitePool,
    course_id: &str,
    module_index: usize,
) -> Result<bool> {
    let result = sqlx::query("DELETE FROM quizzes WHERE course_id = ? AND module_index = ?")
        .bind(course_id)
        .bind(module_index as i64)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
