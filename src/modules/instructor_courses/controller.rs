use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::CourseWithStats;

use super::service::InstructorCourseService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/instructor/courses",
    responses(
        (status = 200, description = "Courses taught by the caller", body = Vec<CourseWithStats>),
        (status = 403, description = "Instructor role required")
    ),
    tag = "Instructor Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_my_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<CourseWithStats>>, AppError> {
    Ok(Json(
        InstructorCourseService::list_my_courses(&state.db, &auth_user).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/instructor/courses/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course with stats", body = CourseWithStats),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Course not found")
    ),
    tag = "Instructor Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseWithStats>, AppError> {
    Ok(Json(
        InstructorCourseService::get_my_course(&state.db, &auth_user, course_id).await?,
    ))
}
