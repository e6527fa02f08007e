use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::CourseWithStats;

use crate::middleware::auth::AuthUser;
use crate::modules::courses::service::{COURSE_WITH_STATS_SELECT, CourseService};
use crate::utils::auth_helpers::ensure_course_access;

pub struct InstructorCourseService;

impl InstructorCourseService {
    /// Courses the caller teaches; admins get every course.
    #[instrument(skip(db))]
    pub async fn list_my_courses(
        db: &PgPool,
        auth_user: &AuthUser,
    ) -> Result<Vec<CourseWithStats>, AppError> {
        let scope = (!auth_user.is_admin()).then_some(auth_user.id);

        let courses = sqlx::query_as::<_, CourseWithStats>(&format!(
            "{COURSE_WITH_STATS_SELECT}
             WHERE $1::uuid IS NULL OR c.instructor_id = $1
             ORDER BY c.title"
        ))
        .bind(scope)
        .fetch_all(db)
        .await?;

        Ok(courses)
    }

    #[instrument(skip(db))]
    pub async fn get_my_course(
        db: &PgPool,
        auth_user: &AuthUser,
        course_id: Uuid,
    ) -> Result<CourseWithStats, AppError> {
        ensure_course_access(db, auth_user, course_id).await?;
        CourseService::get_course(db, course_id).await
    }
}
