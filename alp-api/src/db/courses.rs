//! Course persistence
//!
//! Modules are stored as a JSON array on the course row; each module keeps
//! its asset codes in display order.

use alp_common::{Error, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Course, CourseUpdate, Module, NewCourse, Pagination};

fn course_from_row(row: &SqliteRow) -> Result<Course> {
    let id: String = row.try_get("id")?;
    let modules_json: String = row.try_get("modules")?;
    let modules: Vec<Module> = serde_json::from_str(&modules_json)
        .map_err(|e| Error::Internal(format!("Course {} has unreadable modules: {}", id, e)))?;

    Ok(Course {
        id,
        name: row.try_get("name")?,
        modules,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn encode_modules(modules: &[Module]) -> Result<String> {
    serde_json::to_string(modules)
        .map_err(|e| Error::Internal(format!("Failed to encode modules: {}", e)))
}

/// Insert a new course and return the stored document
pub async fn create_course(pool: &SqlitePool, new: NewCourse) -> Result<Course> {
    let now = Utc::now();
    let course = Course {
        id: Uuid::new_v4().to_string(),
        name: new.name,
        modules: new.modules,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO courses (id, name, modules, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&course.id)
    .bind(&course.name)
    .bind(encode_modules(&course.modules)?)
    .bind(course.created_at)
    .bind(course.updated_at)
    .execute(pool)
    .await?;

    tracing::debug!(course_id = %course.id, modules = course.modules.len(), "Course created");

    Ok(course)
}

/// Load course by id
pub async fn get_course(pool: &SqlitePool, id: &str) -> Result<Option<Course>> {
    let row = sqlx::query(
        "SELECT id, name, modules, created_at, updated_at FROM courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(course_from_row).transpose()
}

/// Page through courses in creation order
pub async fn list_courses(pool: &SqlitePool, page: &Pagination) -> Result<Vec<Course>> {
    let (offset, limit) = page.bounds();
    let rows = sqlx::query(
        r#"
        SELECT id, name, modules, created_at, updated_at
        FROM courses
        ORDER BY created_at ASC, id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    rows.iter().map(course_from_row).collect()
}

/// Apply a partial update; `None` if the course does not exist
pub async fn update_course(
    pool: &SqlitePool,
    id: &str,
    changes: CourseUpdate,
) -> Result<Option<Course>> {
    let modules = changes
        .modules
        .as_deref()
        .map(encode_modules)
        .transpose()?;

    let result = sqlx::query(
        r#"
        UPDATE courses SET
            name = COALESCE(?, name),
            modules = COALESCE(?, modules),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(modules)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_course(pool, id).await
}

/// Delete course by id; referenced assets and its quizzes are left in place
pub async fn delete_course(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
