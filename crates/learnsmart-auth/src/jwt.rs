//! Token creation and verification.
//!
//! ```ignore
//! use learnsmart_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "user@example.com", "instructor", &jwt_config)?;
//! let claims = verify_token(&token, &jwt_config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use learnsmart_config::JwtConfig;
use learnsmart_core::AppError;

use crate::claims::{Claims, RefreshTokenClaims};

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: now + jwt_config.access_token_expiry as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry of an access token.
///
/// # Errors
///
/// 401 for a bad signature, an expired token, or a refresh token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: now + jwt_config.refresh_token_expiry as usize,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create refresh token: {}", e)))
}

pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired refresh token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = create_access_token(user_id, "teach@example.com", "instructor", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "teach@example.com");
        assert_eq!(claims.role, "instructor");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_token_invalid() {
        assert!(verify_token("invalid-token", &test_config()).is_err());
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let token =
            create_access_token(Uuid::new_v4(), "a@example.com", "admin", &test_config()).unwrap();
        let other = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..test_config()
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@example.com".to_string(),
            role: "student".to_string(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = create_refresh_token(user_id, "s@example.com", &config).unwrap();
        let claims = verify_refresh_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let access = create_access_token(user_id, "s@example.com", "student", &config).unwrap();
        let refresh = create_refresh_token(user_id, "s@example.com", &config).unwrap();

        assert!(verify_token(&refresh, &config).is_err());
        assert!(verify_refresh_token(&access, &config).is_err());
    }

    #[test]
    fn test_refresh_outlives_access() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let access = create_access_token(user_id, "s@example.com", "student", &config).unwrap();
        let refresh = create_refresh_token(user_id, "s@example.com", &config).unwrap();

        let access = verify_token(&access, &config).unwrap();
        let refresh = verify_refresh_token(&refresh, &config).unwrap();
        assert!(refresh.exp > access.exp);
    }
}
