use axum::{Json, extract::State};
use tracing::instrument;

use learnsmart_core::AppError;
use learnsmart_models::{AdminStats, InstructorStats};

use super::service::DashboardService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Platform counters", body = AdminStats),
        (status = 403, description = "Admin role required")
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn admin_dashboard(State(state): State<AppState>) -> Result<Json<AdminStats>, AppError> {
    Ok(Json(DashboardService::admin_stats(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/instructor/dashboard",
    responses(
        (status = 200, description = "Counters over the caller's courses", body = InstructorStats),
        (status = 403, description = "Instructor role required")
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn instructor_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<InstructorStats>, AppError> {
    let scope = (!auth_user.is_admin()).then_some(auth_user.id);
    Ok(Json(
        DashboardService::instructor_stats(&state.db, scope).await?,
    ))
}
