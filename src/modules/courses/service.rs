use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use learnsmart_core::{AppError, FileStorage, PaginationMeta};
use learnsmart_models::{
    Course, CourseFilterParams, CourseWithStats, CreateCourseDto, PaginatedCoursesResponse,
    UpdateCourseDto, UserRole,
};

use crate::metrics::track_course_created;
use crate::utils::db_errors::map_db_error;
use crate::utils::files::remove_stored_files;
use crate::utils::search::contains_pattern;

/// Course columns plus instructor name and module/student counts.
/// Dropped enrollments are not counted as students.
pub const COURSE_WITH_STATS_SELECT: &str = "SELECT c.id, c.title, c.description, c.instructor_id,
        u.full_name AS instructor_name, c.status,
        (SELECT COUNT(*) FROM modules m WHERE m.course_id = c.id) AS module_count,
        (SELECT COUNT(*) FROM course_enrollments e
          WHERE e.course_id = c.id AND e.status <> 'dropped') AS student_count,
        c.created_at, c.updated_at
     FROM courses c
     LEFT JOIN users u ON u.id = c.instructor_id";

const COURSE_FILTERS: &str = "($1::course_status IS NULL OR c.status = $1)
     AND ($2::uuid IS NULL OR c.instructor_id = $2)
     AND ($3::text IS NULL OR c.title ILIKE $3 ESCAPE '\\' OR c.description ILIKE $3 ESCAPE '\\')";

const DUPLICATE_TITLE: &str = "A course with this title already exists";

pub struct CourseService;

impl CourseService {
    async fn ensure_instructor(db: &PgPool, instructor_id: Uuid) -> Result<(), AppError> {
        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(instructor_id)
            .fetch_optional(db)
            .await?;

        match role {
            Some(UserRole::Instructor) => Ok(()),
            Some(_) => Err(AppError::bad_request(anyhow!(
                "instructor_id must reference a user with the instructor role"
            ))),
            None => Err(AppError::bad_request(anyhow!("Instructor not found"))),
        }
    }

    #[instrument(skip(dto), fields(title = %dto.title))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        if let Some(instructor_id) = dto.instructor_id {
            Self::ensure_instructor(db, instructor_id).await?;
        }

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (title, description, instructor_id, status)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, description, instructor_id, status, created_at, updated_at",
        )
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.instructor_id)
        .bind(dto.status.unwrap_or_default())
        .fetch_one(db)
        .await
        .map_err(|e| map_db_error(e, DUPLICATE_TITLE))?;

        track_course_created();
        info!(course_id = %course.id, "Course created");

        Ok(course)
    }

    #[instrument]
    pub async fn list_courses(
        db: &PgPool,
        filters: CourseFilterParams,
    ) -> Result<PaginatedCoursesResponse, AppError> {
        let search = contains_pattern(filters.search.as_deref());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM courses c WHERE {COURSE_FILTERS}"
        ))
        .bind(filters.status)
        .bind(filters.instructor_id)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let courses = sqlx::query_as::<_, CourseWithStats>(&format!(
            "{COURSE_WITH_STATS_SELECT}
             WHERE {COURSE_FILTERS}
             ORDER BY c.created_at DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(filters.status)
        .bind(filters.instructor_id)
        .bind(&search)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedCoursesResponse {
            data: courses,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument]
    pub async fn get_course(db: &PgPool, id: Uuid) -> Result<CourseWithStats, AppError> {
        sqlx::query_as::<_, CourseWithStats>(&format!(
            "{COURSE_WITH_STATS_SELECT} WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))
    }

    #[instrument(skip(dto))]
    pub async fn update_course(
        db: &PgPool,
        id: Uuid,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        if dto.clear_instructor && dto.instructor_id.is_some() {
            return Err(AppError::bad_request(anyhow!(
                "instructor_id and clear_instructor cannot be combined"
            )));
        }
        if let Some(instructor_id) = dto.instructor_id {
            Self::ensure_instructor(db, instructor_id).await?;
        }

        sqlx::query_as::<_, Course>(
            "UPDATE courses SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                instructor_id = CASE WHEN $3 THEN NULL ELSE COALESCE($4, instructor_id) END,
                status = COALESCE($5, status),
                updated_at = NOW()
             WHERE id = $6
             RETURNING id, title, description, instructor_id, status, created_at, updated_at",
        )
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.clear_instructor)
        .bind(dto.instructor_id)
        .bind(dto.status)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| map_db_error(e, DUPLICATE_TITLE))?
        .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))
    }

    /// Deletes a course. Uploaded files of its materials are removed first;
    /// rows below the course go with it through `ON DELETE CASCADE`.
    #[instrument(skip(storage))]
    pub async fn delete_course(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: Uuid,
    ) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await?;
        if !exists {
            return Err(AppError::not_found(anyhow!("Course not found")));
        }

        let file_paths = sqlx::query_scalar::<_, String>(
            "SELECT file_path FROM course_materials
             WHERE course_id = $1 AND file_path IS NOT NULL",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let removed = remove_stored_files(storage, file_paths).await;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(course_id = %id, removed_files = removed, "Course deleted");

        Ok(())
    }
}
