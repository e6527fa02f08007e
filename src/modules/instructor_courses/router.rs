use axum::{Router, routing::get};

use super::controller::{get_my_course, list_my_courses};
use crate::state::AppState;

pub fn init_instructor_courses_router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_my_courses))
        .route("/courses/{course_id}", get(get_my_course))
}
