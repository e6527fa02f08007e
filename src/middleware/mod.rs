//! Authentication and authorization.
//!
//! - [`auth`]: The [`auth::AuthUser`] extractor (bearer JWT or trusted identity headers)
//! - [`role`]: Role gate layers and role checking helpers
//!
//! ```ignore
//! Router::new()
//!     .nest("/admin/courses", init_courses_router())
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
//! ```

pub mod auth;
pub mod role;
