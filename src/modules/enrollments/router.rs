use axum::{
    Router,
    routing::{get, patch},
};

use super::controller::{
    enroll_student, list_students, my_courses, remove_student, update_enrollment,
};
use crate::state::AppState;

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/students",
            get(list_students).post(enroll_student),
        )
        .route(
            "/courses/{course_id}/students/{student_id}",
            patch(update_enrollment).delete(remove_student),
        )
}

pub fn init_student_router() -> Router<AppState> {
    Router::new().route("/courses", get(my_courses))
}
