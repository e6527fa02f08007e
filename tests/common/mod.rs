#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use learnsmart::learnsmart_auth::create_access_token;
use learnsmart::learnsmart_config::{
    AuthConfig, CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, StorageConfig,
};
use learnsmart::learnsmart_core::hash_password;
use learnsmart::learnsmart_models::UserRole;
use learnsmart::router::init_router;
use learnsmart::state::AppState;

pub const TEST_PASSWORD: &str = "password123";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub token: String,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-that-is-long-enough".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
    }
}

pub fn email_config() -> EmailConfig {
    EmailConfig {
        enabled: false,
        smtp_host: "localhost".to_string(),
        smtp_port: 1025,
        smtp_username: String::new(),
        smtp_password: String::new(),
        from_email: "noreply@learnsmart.test".to_string(),
        from_name: "LearnSmart".to_string(),
        frontend_url: "http://localhost:3001".to_string(),
        reset_token_ttl_minutes: 60,
    }
}

pub fn temp_storage_dir() -> PathBuf {
    std::env::temp_dir().join(format!("learnsmart-it-{}", Uuid::new_v4()))
}

pub struct TestAppBuilder {
    pool: PgPool,
    rate_limit: RateLimitConfig,
    trust_user_headers: bool,
    storage_dir: PathBuf,
    max_file_size: usize,
}

impl TestAppBuilder {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            rate_limit: RateLimitConfig::default(),
            trust_user_headers: false,
            storage_dir: temp_storage_dir(),
            max_file_size: 1024 * 1024,
        }
    }

    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    pub fn trust_user_headers(mut self) -> Self {
        self.trust_user_headers = true;
        self
    }

    pub fn storage_dir(mut self, dir: PathBuf) -> Self {
        self.storage_dir = dir;
        self
    }

    pub fn max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn build(self) -> Router {
        let state = AppState::new(
            self.pool,
            jwt_config(),
            email_config(),
            CorsConfig {
                allowed_origins: vec!["http://localhost:3001".to_string()],
            },
            self.rate_limit,
            AuthConfig {
                trust_user_headers: self.trust_user_headers,
            },
            StorageConfig {
                base_dir: self.storage_dir,
                base_url: "http://localhost:3000/files".to_string(),
                max_file_size: self.max_file_size,
                allowed_mime_types: vec![],
            },
        );
        init_router(state)
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    TestAppBuilder::new(pool).build()
}

pub async fn create_test_user(pool: &PgPool, email: &str, role: UserRole) -> TestUser {
    let hashed = hash_password(TEST_PASSWORD).unwrap();
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password, full_name, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind(hashed)
    .bind(format!("Test {}", role))
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    let token = create_access_token(id, email, role.as_str(), &jwt_config()).unwrap();

    TestUser {
        id,
        email: email.to_string(),
        role,
        token,
    }
}

pub async fn create_test_course(pool: &PgPool, title: &str, instructor_id: Option<Uuid>) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (title, instructor_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(title)
    .bind(instructor_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4().simple())
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
