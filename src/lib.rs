//! # LearnSmart Admin API
//!
//! REST API for administering the LearnSmart learning platform, built with
//! Axum and PostgreSQL.
//!
//! ## Roles
//!
//! | Role | Routes | Access |
//! |------|--------|--------|
//! | Admin | `/api/admin/*`, `/api/instructor/*` | Every user and course |
//! | Instructor | `/api/instructor/*` | Courses assigned to them |
//! | Student | `/api/student/*` | Their own enrollments |
//!
//! Every authenticated role can use `/api/users/me`. The first admin is
//! created with `learnsmart-cli create-admin`; registration only creates
//! students and instructors.
//!
//! ## Authentication
//!
//! Requests carry `Authorization: Bearer <access token>`. When
//! `AUTH_TRUST_USER_HEADERS=true` a gateway may instead pass `X-User-ID`
//! (and optionally `X-User-Role`). Either way the role used for access checks
//! is the one stored for the user.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── middleware/   # AuthUser extractor and role gates
//! ├── modules/      # Feature modules (controller / service / router)
//! └── utils/        # Course access checks, db error mapping, email, files
//! ```
//!
//! ## Modules
//!
//! - [`docs`]: OpenAPI document
//! - [`logging`]: Tracing setup and request logging middleware
//! - [`metrics`]: Prometheus recorder, middleware and counters
//! - [`middleware`]: Authentication and authorization
//! - [`modules`]: Feature modules
//! - [`router`]: Application router
//! - [`state`]: Shared application state
//! - [`utils`]: Shared helpers
//! - [`validator`]: Validated JSON extractor

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use learnsmart_auth;
pub use learnsmart_config;
pub use learnsmart_core;
pub use learnsmart_db;
pub use learnsmart_models;
