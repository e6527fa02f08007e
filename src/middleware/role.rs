//! Role gates.
//!
//! Route groups are wrapped with one of the `require_*` layers. The layer
//! authenticates the caller, checks the role stored in `users.role`, and
//! leaves the resolved [`AuthUser`] in the request extensions so handlers
//! extracting `AuthUser` do not hit the database again.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use learnsmart_core::AppError;
use learnsmart_models::UserRole;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&auth_user, allowed_roles)?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &[UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_instructor(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        &[UserRole::Admin, UserRole::Instructor],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Any signed-in user.
pub async fn require_student(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        &[UserRole::Admin, UserRole::Instructor, UserRole::Student],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub fn check_role(auth_user: &AuthUser, required_role: UserRole) -> Result<(), AppError> {
    if auth_user.role != required_role {
        return Err(AppError::forbidden(format!(
            "Access denied. Required role: {}, but user has role: {}",
            required_role, auth_user.role
        )));
    }

    Ok(())
}

pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&auth_user.role) {
        let allowed = allowed_roles
            .iter()
            .map(UserRole::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}, but user has role: {}",
            allowed, auth_user.role
        )));
    }

    Ok(())
}

pub fn role_hierarchy_level(role: &UserRole) -> u8 {
    match role {
        UserRole::Admin => 2,
        UserRole::Instructor => 1,
        UserRole::Student => 0,
    }
}

pub fn check_role_hierarchy(
    user_role: &UserRole,
    minimum_required_role: &UserRole,
) -> Result<(), AppError> {
    if role_hierarchy_level(user_role) < role_hierarchy_level(minimum_required_role) {
        return Err(AppError::forbidden(format!(
            "Access denied. Minimum required role: {}, but user has role: {}",
            minimum_required_role, user_role
        )));
    }

    Ok(())
}
