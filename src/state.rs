use std::sync::Arc;

use sqlx::PgPool;

use learnsmart_config::{
    AuthConfig, CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, StorageConfig,
};
use learnsmart_core::file_storage::DEFAULT_ALLOWED_MIME_TYPES;
use learnsmart_core::{FileStorage, LocalFileStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub auth_config: AuthConfig,
    pub storage_config: StorageConfig,
    pub file_storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Builds the state with a local-disk file storage rooted at `storage_config.base_dir`.
    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        email_config: EmailConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
        auth_config: AuthConfig,
        storage_config: StorageConfig,
    ) -> Self {
        let allowed_mime_types = if storage_config.allowed_mime_types.is_empty() {
            DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect()
        } else {
            storage_config.allowed_mime_types.clone()
        };

        let file_storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::with_limits(
            storage_config.base_dir.clone(),
            storage_config.base_url.clone(),
            storage_config.max_file_size,
            allowed_mime_types,
        ));

        Self {
            db,
            jwt_config,
            email_config,
            cors_config,
            rate_limit_config,
            auth_config,
            storage_config,
            file_storage,
        }
    }

    pub fn from_env(db: PgPool) -> Self {
        Self::new(
            db,
            JwtConfig::from_env(),
            EmailConfig::from_env(),
            CorsConfig::from_env(),
            RateLimitConfig::from_env(),
            AuthConfig::from_env(),
            StorageConfig::from_env(),
        )
    }
}
