use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{change_password, get_profile, update_profile};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route("/me/password", post(change_password))
}
