use axum::{Router, routing::get};

use super::controller::{create_quiz, delete_quiz, get_quiz, list_quizzes, update_quiz};
use crate::state::AppState;

pub fn init_quizzes_router() -> Router<AppState> {
    Router::new()
        .route("/modules/{id}/quizzes", get(list_quizzes).post(create_quiz))
        .route(
            "/quizzes/{id}",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        )
}
