use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::{AdminStats, InstructorStats};

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn admin_stats(db: &PgPool) -> Result<AdminStats, AppError> {
        let stats = sqlx::query_as::<_, AdminStats>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admins,
                (SELECT COUNT(*) FROM users WHERE role = 'instructor') AS instructors,
                (SELECT COUNT(*) FROM users WHERE role = 'student') AS students,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM courses WHERE status = 'draft') AS draft_courses,
                (SELECT COUNT(*) FROM courses WHERE status = 'published') AS published_courses,
                (SELECT COUNT(*) FROM courses WHERE status = 'archived') AS archived_courses,
                (SELECT COUNT(*) FROM course_enrollments) AS total_enrollments",
        )
        .fetch_one(db)
        .await?;

        Ok(stats)
    }

    /// Counters over the courses taught by `instructor_id`, or over every
    /// course when it is `None`.
    #[instrument(skip(db))]
    pub async fn instructor_stats(
        db: &PgPool,
        instructor_id: Option<Uuid>,
    ) -> Result<InstructorStats, AppError> {
        let stats = sqlx::query_as::<_, InstructorStats>(
            "WITH owned AS (
                SELECT id FROM courses WHERE $1::uuid IS NULL OR instructor_id = $1
             )
             SELECT
                (SELECT COUNT(*) FROM owned) AS courses,
                (SELECT COUNT(*) FROM modules WHERE course_id IN (SELECT id FROM owned)) AS modules,
                (SELECT COUNT(*) FROM course_materials
                  WHERE course_id IN (SELECT id FROM owned)) AS materials,
                (SELECT COUNT(*) FROM quizzes WHERE course_id IN (SELECT id FROM owned)) AS quizzes,
                (SELECT COUNT(DISTINCT student_id) FROM course_enrollments
                  WHERE course_id IN (SELECT id FROM owned) AND status = 'active') AS active_students",
        )
        .bind(instructor_id)
        .fetch_one(db)
        .await?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnsmart_models::UserRole;

    use crate::utils::test_helpers::{insert_course, insert_user};

    #[sqlx::test(migrations = "./migrations")]
    async fn test_admin_stats(pool: PgPool) {
        insert_user(&pool, "a@example.com", UserRole::Admin).await;
        let instructor = insert_user(&pool, "i@example.com", UserRole::Instructor).await;
        insert_user(&pool, "s@example.com", UserRole::Student).await;
        insert_course(&pool, "One", Some(instructor.id)).await;

        let stats = DashboardService::admin_stats(&pool).await.unwrap();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.admins, 1);
        assert_eq!(stats.instructors, 1);
        assert_eq!(stats.students, 1);
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.draft_courses, 1);
        assert_eq!(stats.total_enrollments, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_instructor_stats_are_scoped(pool: PgPool) {
        let mine = insert_user(&pool, "mine@example.com", UserRole::Instructor).await;
        let other = insert_user(&pool, "other@example.com", UserRole::Instructor).await;
        let student = insert_user(&pool, "s@example.com", UserRole::Student).await;
        let course_id = insert_course(&pool, "Mine", Some(mine.id)).await;
        insert_course(&pool, "Theirs", Some(other.id)).await;

        sqlx::query("INSERT INTO modules (course_id, title, order_index) VALUES ($1, 'M', 0)")
            .bind(course_id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO course_enrollments (course_id, student_id) VALUES ($1, $2)")
            .bind(course_id)
            .bind(student.id)
            .execute(&pool)
            .await
            .unwrap();

        let stats = DashboardService::instructor_stats(&pool, Some(mine.id))
            .await
            .unwrap();
        assert_eq!(stats.courses, 1);
        assert_eq!(stats.modules, 1);
        assert_eq!(stats.active_students, 1);

        let all = DashboardService::instructor_stats(&pool, None).await.unwrap();
        assert_eq!(all.courses, 2);
    }
}
