use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::{
    EnrollStudentDto, EnrolledStudent, EnrollmentFilterParams, PaginatedEnrolledStudentsResponse,
    StudentCourse, UpdateEnrollmentDto,
};

use super::service::EnrollmentService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::auth_helpers::ensure_course_access;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/instructor/courses/{course_id}/students",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        EnrollmentFilterParams
    ),
    responses(
        (status = 200, description = "Enrolled students", body = PaginatedEnrolledStudentsResponse),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Course not found")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
    Query(filters): Query<EnrollmentFilterParams>,
) -> Result<Json<PaginatedEnrolledStudentsResponse>, AppError> {
    ensure_course_access(&state.db, &auth_user, course_id).await?;
    Ok(Json(
        EnrollmentService::list_students(&state.db, course_id, filters).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/instructor/courses/{course_id}/students",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    request_body = EnrollStudentDto,
    responses(
        (status = 201, description = "Student enrolled", body = EnrolledStudent),
        (status = 400, description = "Not exactly one identifier, or the user is not a student"),
        (status = 404, description = "Course or student not found"),
        (status = 409, description = "Already enrolled")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn enroll_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<EnrollStudentDto>,
) -> Result<(StatusCode, Json<EnrolledStudent>), AppError> {
    ensure_course_access(&state.db, &auth_user, course_id).await?;
    let enrolled = EnrollmentService::enroll_student(&state.db, course_id, dto).await?;
    Ok((StatusCode::CREATED, Json(enrolled)))
}

#[utoipa::path(
    patch,
    path = "/api/instructor/courses/{course_id}/students/{student_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("student_id" = Uuid, Path, description = "Student user ID")
    ),
    request_body = UpdateEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment updated", body = EnrolledStudent),
        (status = 404, description = "Enrollment not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((course_id, student_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<UpdateEnrollmentDto>,
) -> Result<Json<EnrolledStudent>, AppError> {
    ensure_course_access(&state.db, &auth_user, course_id).await?;
    Ok(Json(
        EnrollmentService::update_enrollment(&state.db, course_id, student_id, dto).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/instructor/courses/{course_id}/students/{student_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("student_id" = Uuid, Path, description = "Student user ID")
    ),
    responses(
        (status = 204, description = "Student removed from the course"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((course_id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    ensure_course_access(&state.db, &auth_user, course_id).await?;
    EnrollmentService::remove_student(&state.db, course_id, student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/student/courses",
    responses(
        (status = 200, description = "The caller's enrollments", body = Vec<StudentCourse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn my_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<StudentCourse>>, AppError> {
    Ok(Json(
        EnrollmentService::my_courses(&state.db, auth_user.id).await?,
    ))
}
