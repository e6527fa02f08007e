//! # LearnSmart Config
//!
//! Configuration structures loaded from environment variables. Every struct
//! has a `from_env()` constructor with development-friendly defaults.
//!
//! - [`auth`]: Trusted identity header mode
//! - [`cors`]: Allowed browser origins
//! - [`email`]: SMTP settings for password reset mail
//! - [`jwt`]: Token secret and lifetimes
//! - [`rate_limit`]: Per-IP request limits
//! - [`server`]: Bind address and database pool size
//! - [`storage`]: Material upload storage
//!
//! # Example
//!
//! ```ignore
//! use learnsmart_config::{JwtConfig, StorageConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod server;
pub mod storage;

pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v == "true" || v == "1"
        })
        .unwrap_or(default)
}
