use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use learnsmart_core::{AppError, PaginationMeta};
use learnsmart_models::{
    EnrollStudentDto, EnrolledStudent, EnrollmentFilterParams, PaginatedEnrolledStudentsResponse,
    StudentCourse, UpdateEnrollmentDto, UserRole,
};

use crate::utils::db_errors::map_db_error;

const ENROLLED_STUDENT_COLUMNS: &str = "e.id AS enrollment_id, e.student_id, u.full_name, u.email,
     e.status, e.progress, e.enrolled_at, e.updated_at";

pub struct EnrollmentService;

impl EnrollmentService {
    #[instrument(skip(db))]
    pub async fn list_students(
        db: &PgPool,
        course_id: Uuid,
        filters: EnrollmentFilterParams,
    ) -> Result<PaginatedEnrolledStudentsResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM course_enrollments
             WHERE course_id = $1 AND ($2::enrollment_status IS NULL OR status = $2)",
        )
        .bind(course_id)
        .bind(filters.status)
        .fetch_one(db)
        .await?;

        let students = sqlx::query_as::<_, EnrolledStudent>(&format!(
            "SELECT {ENROLLED_STUDENT_COLUMNS}
             FROM course_enrollments e
             JOIN users u ON u.id = e.student_id
             WHERE e.course_id = $1 AND ($2::enrollment_status IS NULL OR e.status = $2)
             ORDER BY u.full_name, u.email
             LIMIT $3 OFFSET $4"
        ))
        .bind(course_id)
        .bind(filters.status)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedEnrolledStudentsResponse {
            data: students,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    async fn resolve_student(db: &PgPool, dto: &EnrollStudentDto) -> Result<Uuid, AppError> {
        let found = match (dto.student_id, dto.email.as_deref()) {
            (Some(id), None) => {
                sqlx::query_as::<_, (Uuid, UserRole)>("SELECT id, role FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(db)
                    .await?
            }
            (None, Some(email)) => {
                sqlx::query_as::<_, (Uuid, UserRole)>(
                    "SELECT id, role FROM users WHERE email = $1",
                )
                .bind(email.trim().to_lowercase())
                .fetch_optional(db)
                .await?
            }
            _ => {
                return Err(AppError::bad_request(anyhow!(
                    "Provide exactly one of student_id or email"
                )));
            }
        };

        match found {
            Some((id, UserRole::Student)) => Ok(id),
            Some(_) => Err(AppError::bad_request(anyhow!(
                "Only users with the student role can be enrolled"
            ))),
            None => Err(AppError::not_found(anyhow!("Student not found"))),
        }
    }

    #[instrument(skip(db))]
    pub async fn enroll_student(
        db: &PgPool,
        course_id: Uuid,
        dto: EnrollStudentDto,
    ) -> Result<EnrolledStudent, AppError> {
        let student_id = Self::resolve_student(db, &dto).await?;

        let enrolled = sqlx::query_as::<_, EnrolledStudent>(&format!(
            "WITH e AS (
                INSERT INTO course_enrollments (course_id, student_id)
                VALUES ($1, $2)
                RETURNING *
             )
             SELECT {ENROLLED_STUDENT_COLUMNS}
             FROM e JOIN users u ON u.id = e.student_id"
        ))
        .bind(course_id)
        .bind(student_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_db_error(e, "Student is already enrolled in this course"))?;

        info!(course_id = %course_id, student_id = %student_id, "Student enrolled");

        Ok(enrolled)
    }

    #[instrument(skip(db))]
    pub async fn update_enrollment(
        db: &PgPool,
        course_id: Uuid,
        student_id: Uuid,
        dto: UpdateEnrollmentDto,
    ) -> Result<EnrolledStudent, AppError> {
        sqlx::query_as::<_, EnrolledStudent>(&format!(
            "WITH e AS (
                UPDATE course_enrollments SET
                    status = COALESCE($1, status),
                    progress = COALESCE($2, progress),
                    updated_at = NOW()
                WHERE course_id = $3 AND student_id = $4
                RETURNING *
             )
             SELECT {ENROLLED_STUDENT_COLUMNS}
             FROM e JOIN users u ON u.id = e.student_id"
        ))
        .bind(dto.effective_status())
        .bind(dto.progress)
        .bind(course_id)
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Enrollment not found")))
    }

    #[instrument(skip(db))]
    pub async fn remove_student(
        db: &PgPool,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM course_enrollments WHERE course_id = $1 AND student_id = $2",
        )
        .bind(course_id)
        .bind(student_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Enrollment not found")));
        }
        Ok(())
    }

    /// The caller's enrollments, most recent first.
    #[instrument(skip(db))]
    pub async fn my_courses(db: &PgPool, student_id: Uuid) -> Result<Vec<StudentCourse>, AppError> {
        let courses = sqlx::query_as::<_, StudentCourse>(
            "SELECT e.id AS enrollment_id, c.id AS course_id, c.title AS course_title,
                    c.description AS course_description, u.full_name AS instructor_name,
                    (SELECT COUNT(*) FROM modules m WHERE m.course_id = c.id) AS module_count,
                    e.status, e.progress, e.enrolled_at
             FROM course_enrollments e
             JOIN courses c ON c.id = e.course_id
             LEFT JOIN users u ON u.id = c.instructor_id
             WHERE e.student_id = $1
             ORDER BY e.enrolled_at DESC",
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(courses)
    }
}
