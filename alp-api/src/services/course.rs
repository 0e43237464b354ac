//! Course population
//!
//! Replaces each module's asset codes with the stored English assets,
//! keeping module order and within-module order.

use sqlx::SqlitePool;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{PopulatedCourse, PopulatedModule, SOURCE_LANGUAGE};

/// Load a course with every asset reference resolved
///
/// A reference with no matching asset fails the whole request with
/// [`ApiError::UnresolvedAssetReference`]; nothing is dropped.
pub async fn get_course_with_assets(pool: &SqlitePool, course_id: &str) -> ApiResult<PopulatedCourse> {
    let course = db::get_course(pool, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

    let mut modules = Vec::with_capacity(course.modules.len());

    for (module_index, module) in course.modules.into_iter().enumerate() {
        let mut assets = Vec::with_capacity(module.assets.len());

        for asset_code in module.assets {
            match db::find_asset_by_code(pool, &asset_code, SOURCE_LANGUAGE).await? {
                Some(asset) => assets.push(asset),
                None => {
                    tracing::warn!(
                        course_id = %course.id,
                        module_index,
                        asset_code = %asset_code,
                        "Course references unknown asset"
                    );
                    return Err(ApiError::UnresolvedAssetReference {
                        module_index,
                        asset_code,
                    });
                }
            }
        }

        modules.push(PopulatedModule {
            module_type: module.module_type,
            code: module.code,
            assets,
        });
    }

    Ok(PopulatedCourse {
        id: course.id,
        name: course.name,
        modules,
        created_at: course.created_at,
        updated_at: course.updated_at,
    })
}
