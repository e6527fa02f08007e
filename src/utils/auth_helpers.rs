use anyhow::anyhow;
use sqlx::PgPool;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::{Course, Module, UserRole};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{check_role, check_role_hierarchy};

/// Loads a course the caller may manage.
///
/// Admins may manage every course; instructors only the ones assigned to
/// them. A missing course is 404 regardless of the caller.
pub async fn ensure_course_access(
    db: &PgPool,
    auth_user: &AuthUser,
    course_id: Uuid,
) -> Result<Course, AppError> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT id, title, description, instructor_id, status, created_at, updated_at
         FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))?;

    if check_role(auth_user, UserRole::Admin).is_ok() {
        return Ok(course);
    }

    check_role_hierarchy(&auth_user.role, &UserRole::Instructor)?;

    if course.instructor_id != Some(auth_user.id) {
        return Err(AppError::forbidden(
            "You do not have access to this course".to_string(),
        ));
    }

    Ok(course)
}

/// Loads a module and checks access to its course.
pub async fn load_module_with_access(
    db: &PgPool,
    auth_user: &AuthUser,
    module_id: Uuid,
) -> Result<Module, AppError> {
    let module = sqlx::query_as::<_, Module>(
        "SELECT id, course_id, title, description, order_index, prerequisite_module_id,
                created_at, updated_at
         FROM modules WHERE id = $1",
    )
    .bind(module_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Module not found")))?;

    ensure_course_access(db, auth_user, module.course_id).await?;

    Ok(module)
}
