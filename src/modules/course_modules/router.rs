use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{
    create_module, delete_module, get_module, list_modules, reorder_modules, update_module,
};
use crate::state::AppState;

pub fn init_course_modules_router() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/modules",
            get(list_modules).post(create_module),
        )
        .route("/courses/{course_id}/modules/reorder", put(reorder_modules))
        .route(
            "/modules/{id}",
            get(get_module).put(update_module).delete(delete_module),
        )
}
