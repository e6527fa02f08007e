pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_enrollments_router, init_student_router};
