use axum::{
    Router,
    routing::{get, patch},
};

use super::controller::{create_user, delete_user, get_user, list_users, update_user_role};
use crate::state::AppState;

pub fn init_admin_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/role", patch(update_user_role))
}
