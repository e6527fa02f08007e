pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_admin_dashboard_router, init_instructor_dashboard_router};
