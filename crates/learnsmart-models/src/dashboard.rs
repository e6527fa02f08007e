use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
pub struct AdminStats {
    pub total_users: i64,
    pub admins: i64,
    pub instructors: i64,
    pub students: i64,
    pub total_courses: i64,
    pub draft_courses: i64,
    pub published_courses: i64,
    pub archived_courses: i64,
    pub total_enrollments: i64,
}

/// Counters over the courses an instructor teaches.
#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
pub struct InstructorStats {
    pub courses: i64,
    pub modules: i64,
    pub materials: i64,
    pub quizzes: i64,
    pub active_students: i64,
}
