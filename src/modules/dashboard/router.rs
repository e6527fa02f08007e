use axum::{Router, routing::get};

use super::controller::{admin_dashboard, instructor_dashboard};
use crate::state::AppState;

pub fn init_admin_dashboard_router() -> Router<AppState> {
    Router::new().route("/dashboard", get(admin_dashboard))
}

pub fn init_instructor_dashboard_router() -> Router<AppState> {
    Router::new().route("/dashboard", get(instructor_dashboard))
}
