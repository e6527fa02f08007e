use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access token claims.
///
/// `role` is informational for clients; the server re-reads the role from
/// the `users` table on every request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// `admin`, `instructor` or `student`
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Refresh token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    /// Unique token identifier so two refresh tokens minted in the same second differ
    pub jti: String,
}
