use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use learnsmart_auth::verify_token;
use learnsmart_core::AppError;
use learnsmart_models::{User, UserRole};

use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller.
///
/// Identity comes from a bearer JWT, or from the `X-User-ID` header when
/// trusted-header mode is on. The role is always the one currently stored in
/// `users.role`, never the one carried by the token or a header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.id
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn resolve_user_id(headers: &HeaderMap, state: &AppState) -> Result<Uuid, AppError> {
    if let Some(auth_header) = header_str(headers, header::AUTHORIZATION.as_str()) {
        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        return Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()));
    }

    if state.auth_config.trust_user_headers
        && let Some(user_id) = header_str(headers, USER_ID_HEADER)
    {
        return Uuid::parse_str(user_id)
            .map_err(|_| AppError::unauthorized("Invalid X-User-ID header".to_string()));
    }

    Err(AppError::unauthorized(
        "Missing authorization header".to_string(),
    ))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(auth_user.clone());
        }

        let user_id = resolve_user_id(&parts.headers, state)?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found".to_string()))?;

        if let Some(claimed_role) = header_str(&parts.headers, USER_ROLE_HEADER)
            && claimed_role.parse::<UserRole>().ok() != Some(user.role)
        {
            return Err(AppError::forbidden("Role mismatch".to_string()));
        }

        let auth_user = AuthUser::from(user);
        parts.extensions.insert(auth_user.clone());

        Ok(auth_user)
    }
}
