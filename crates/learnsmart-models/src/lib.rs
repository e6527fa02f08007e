//! # LearnSmart Models
//!
//! Domain models and DTOs for the LearnSmart API: database rows, request
//! bodies with their validation rules, and response shapes.
//!
//! - [`auth`]: Registration, login, token refresh and password reset
//! - [`users`]: Users, roles and profile DTOs
//! - [`courses`]: Courses and their listing filters
//! - [`modules`]: Ordered course modules
//! - [`materials`]: Module materials (links, videos, uploaded documents)
//! - [`quizzes`]: Module quizzes and their questions
//! - [`enrollments`]: Student enrollments in courses
//! - [`dashboard`]: Aggregate counters for the admin and instructor dashboards

pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod materials;
pub mod modules;
pub mod quizzes;
pub mod users;
mod validation;

pub use auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest,
    RegisterRequest, ResetPasswordRequest,
};
pub use courses::{
    Course, CourseFilterParams, CourseStatus, CourseWithStats, CreateCourseDto,
    PaginatedCoursesResponse, UpdateCourseDto,
};
pub use dashboard::{AdminStats, InstructorStats};
pub use enrollments::{
    EnrolledStudent, Enrollment, EnrollmentFilterParams, EnrollmentStatus, EnrollStudentDto,
    PaginatedEnrolledStudentsResponse, StudentCourse, UpdateEnrollmentDto,
};
pub use materials::{CreateMaterialDto, Material, MaterialType, UpdateMaterialDto, UploadMaterialForm};
pub use modules::{
    CreateModuleDto, DeleteModuleParams, DeleteModuleResponse, Module, ModuleWithCounts,
    ReorderModulesDto, UpdateModuleDto,
};
pub use quizzes::{
    CreateQuizDto, DEFAULT_PASSING_SCORE, Quiz, QuizDetail, QuizQuestion, UpdateQuizDto,
    validate_questions,
};
pub use users::{
    ChangePasswordDto, CreateUserDto, PaginatedUsersResponse, UpdateProfileDto, UpdateUserRoleDto,
    User, UserFilterParams, UserRole, UserWithPassword,
};
