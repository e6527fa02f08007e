pub mod admin_users;
pub mod auth;
pub mod course_modules;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod instructor_courses;
pub mod materials;
pub mod quizzes;
pub mod users;
