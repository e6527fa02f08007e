use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::get;
use axum::{Json, Router, middleware};
use governor::middleware::NoOpMiddleware;
use serde_json::{Value, json};
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfig;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::auth::{USER_ID_HEADER, USER_ROLE_HEADER};
use crate::middleware::role::{require_admin, require_instructor, require_student};
use crate::modules::admin_users::init_admin_users_router;
use crate::modules::auth::init_auth_router;
use crate::modules::course_modules::init_course_modules_router;
use crate::modules::courses::init_courses_router;
use crate::modules::dashboard::{init_admin_dashboard_router, init_instructor_dashboard_router};
use crate::modules::enrollments::{init_enrollments_router, init_student_router};
use crate::modules::instructor_courses::init_instructor_courses_router;
use crate::modules::materials::init_materials_router;
use crate::modules::quizzes::init_quizzes_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;

fn rate_limited(
    router: Router<AppState>,
    config: Option<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>>,
) -> Router<AppState> {
    match config {
        Some(config) => router.layer(GovernorLayer::new(Arc::new(config))),
        None => router,
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let rate_limit = &state.rate_limit_config;
    let (auth_limit, general_limit) = if rate_limit.enabled {
        (
            rate_limit.auth_governor_config(),
            rate_limit.general_governor_config(),
        )
    } else {
        (None, None)
    };

    let admin = Router::new()
        .nest("/users", init_admin_users_router())
        .nest("/courses", init_courses_router())
        .merge(init_admin_dashboard_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let instructor = Router::new()
        .merge(init_instructor_courses_router())
        .merge(init_instructor_dashboard_router())
        .merge(init_course_modules_router())
        .merge(init_materials_router(state.storage_config.max_file_size))
        .merge(init_quizzes_router())
        .merge(init_enrollments_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_instructor,
        ));

    let student = init_student_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_student));

    let users = init_users_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_student));

    let api = rate_limited(
        Router::new()
            .nest("/users", users)
            .nest("/admin", admin)
            .nest("/instructor", instructor)
            .nest("/student", student),
        general_limit,
    )
    .nest("/auth", rate_limited(init_auth_router(), auth_limit));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest_service("/files", ServeDir::new(&state.storage_config.base_dir))
        .nest("/api", api)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
