use anyhow::anyhow;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use learnsmart_auth::{create_access_token, create_refresh_token, verify_refresh_token};
use learnsmart_config::{EmailConfig, JwtConfig};
use learnsmart_core::tokens::{generate_reset_token, hash_token};
use learnsmart_core::{AppError, hash_password, verify_password};
use learnsmart_models::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, User, UserRole, UserWithPassword,
};

use crate::metrics::{
    track_jwt_issued, track_user_created, track_user_login_failure, track_user_login_success,
};
use crate::utils::db_errors::map_db_error;
use crate::utils::email::EmailService;

const USER_COLUMNS: &str = "id, email, full_name, role, created_at, updated_at";

pub struct AuthService;

impl AuthService {
    fn issue_tokens(user: User, jwt_config: &JwtConfig) -> Result<LoginResponse, AppError> {
        let access_token =
            create_access_token(user.id, &user.email, user.role.as_str(), jwt_config)?;
        let refresh_token = create_refresh_token(user.id, &user.email, jwt_config)?;
        track_jwt_issued();

        Ok(LoginResponse {
            access_token,
            refresh_token,
            dashboard_path: user.role.dashboard_path().to_string(),
            user,
        })
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn register_user(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let role = dto.role.unwrap_or(UserRole::Student);
        if role == UserRole::Admin {
            return Err(AppError::forbidden(
                "Admin accounts cannot be created through registration".to_string(),
            ));
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(dto.email.trim().to_lowercase())
        .bind(&hashed_password)
        .bind(dto.full_name.trim())
        .bind(role)
        .fetch_one(db)
        .await
        .map_err(|e| map_db_error(e, "A user with this email already exists"))?;

        track_user_created(role.as_str());

        Self::issue_tokens(user, jwt_config)
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, email, password, full_name, role, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(dto.email.trim().to_lowercase())
        .fetch_optional(db)
        .await?;

        let Some(user) = user else {
            track_user_login_failure("unknown_email");
            return Err(AppError::unauthorized(
                "Invalid email or password".to_string(),
            ));
        };

        if !verify_password(&dto.password, &user.password)? {
            track_user_login_failure("wrong_password");
            return Err(AppError::unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        track_user_login_success(user.role.as_str());

        Self::issue_tokens(user.into(), jwt_config)
    }

    #[instrument(skip_all)]
    pub async fn refresh_tokens(
        db: &PgPool,
        dto: RefreshTokenRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let claims = verify_refresh_token(&dto.refresh_token, jwt_config)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found".to_string()))?;

        Self::issue_tokens(user, jwt_config)
    }

    /// Issues a reset token when the account exists. Never reveals whether it does.
    #[instrument(skip(db, dto, email_config), fields(email = %dto.email))]
    pub async fn forgot_password(
        db: &PgPool,
        dto: ForgotPasswordRequest,
        email_config: &EmailConfig,
    ) -> Result<(), AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(dto.email.trim().to_lowercase())
        .fetch_optional(db)
        .await?;

        let Some(user) = user else {
            return Ok(());
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(email_config.reset_token_ttl_minutes);

        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE password_reset_tokens SET used_at = NOW()
             WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)",
        )
        .bind(user.id)
        .bind(hash_token(&token))
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let email_service = EmailService::new(email_config.clone());
        if let Err(e) = email_service
            .send_password_reset_email(&user.email, &user.full_name, &token)
            .await
        {
            error!(user_id = %user.id, error = %e, "Failed to send password reset email");
        }

        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn reset_password(
        db: &PgPool,
        dto: ResetPasswordRequest,
        email_config: &EmailConfig,
    ) -> Result<(), AppError> {
        let invalid = || AppError::bad_request(anyhow!("Invalid or expired reset token"));

        let (token_id, user_id) = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT id, user_id FROM password_reset_tokens
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW()",
        )
        .bind(hash_token(dto.token.trim()))
        .fetch_optional(db)
        .await?
        .ok_or_else(invalid)?;

        let hashed_password = hash_password(&dto.new_password)?;

        let mut tx = db.begin().await?;

        // Claim the token first so a concurrent reset with the same token loses.
        let claimed = sqlx::query(
            "UPDATE password_reset_tokens SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(token_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(invalid());
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&hashed_password)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let email_service = EmailService::new(email_config.clone());
        if let Err(e) = email_service
            .send_password_reset_confirmation(&user.email, &user.full_name)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to send password change confirmation");
        }

        Ok(())
    }
}
