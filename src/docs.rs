use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use learnsmart_core::{PaginationMeta, PaginationParams};
use learnsmart_models::{
    AdminStats, ChangePasswordDto, Course, CourseStatus, CourseWithStats, CreateCourseDto,
    CreateMaterialDto, CreateModuleDto, CreateQuizDto, CreateUserDto, DeleteModuleResponse,
    EnrollStudentDto, EnrolledStudent, EnrollmentStatus, ForgotPasswordRequest, InstructorStats,
    LoginRequest, LoginResponse, Material, MaterialType, MessageResponse, Module,
    ModuleWithCounts, PaginatedCoursesResponse, PaginatedEnrolledStudentsResponse,
    PaginatedUsersResponse, QuizDetail, QuizQuestion, RefreshTokenRequest, RegisterRequest,
    ReorderModulesDto, ResetPasswordRequest, StudentCourse, UpdateCourseDto, UpdateEnrollmentDto,
    UpdateMaterialDto, UpdateModuleDto, UpdateProfileDto, UpdateQuizDto, UpdateUserRoleDto,
    UploadMaterialForm, User, UserRole,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::change_password,
        crate::modules::admin_users::controller::list_users,
        crate::modules::admin_users::controller::get_user,
        crate::modules::admin_users::controller::create_user,
        crate::modules::admin_users::controller::update_user_role,
        crate::modules::admin_users::controller::delete_user,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::list_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::dashboard::controller::admin_dashboard,
        crate::modules::dashboard::controller::instructor_dashboard,
        crate::modules::instructor_courses::controller::list_my_courses,
        crate::modules::instructor_courses::controller::get_my_course,
        crate::modules::course_modules::controller::list_modules,
        crate::modules::course_modules::controller::create_module,
        crate::modules::course_modules::controller::reorder_modules,
        crate::modules::course_modules::controller::get_module,
        crate::modules::course_modules::controller::update_module,
        crate::modules::course_modules::controller::delete_module,
        crate::modules::materials::controller::list_materials,
        crate::modules::materials::controller::create_material,
        crate::modules::materials::controller::upload_material,
        crate::modules::materials::controller::update_material,
        crate::modules::materials::controller::delete_material,
        crate::modules::quizzes::controller::list_quizzes,
        crate::modules::quizzes::controller::create_quiz,
        crate::modules::quizzes::controller::get_quiz,
        crate::modules::quizzes::controller::update_quiz,
        crate::modules::quizzes::controller::delete_quiz,
        crate::modules::enrollments::controller::list_students,
        crate::modules::enrollments::controller::enroll_student,
        crate::modules::enrollments::controller::update_enrollment,
        crate::modules::enrollments::controller::remove_student,
        crate::modules::enrollments::controller::my_courses,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            PaginationMeta,
            PaginationParams,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            User,
            UserRole,
            CreateUserDto,
            UpdateProfileDto,
            ChangePasswordDto,
            UpdateUserRoleDto,
            PaginatedUsersResponse,
            Course,
            CourseStatus,
            CourseWithStats,
            CreateCourseDto,
            UpdateCourseDto,
            PaginatedCoursesResponse,
            AdminStats,
            InstructorStats,
            Module,
            ModuleWithCounts,
            CreateModuleDto,
            UpdateModuleDto,
            ReorderModulesDto,
            DeleteModuleResponse,
            Material,
            MaterialType,
            CreateMaterialDto,
            UpdateMaterialDto,
            UploadMaterialForm,
            QuizQuestion,
            QuizDetail,
            CreateQuizDto,
            UpdateQuizDto,
            EnrollmentStatus,
            EnrolledStudent,
            EnrollStudentDto,
            UpdateEnrollmentDto,
            PaginatedEnrolledStudentsResponse,
            StudentCourse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password reset"),
        (name = "Users", description = "The caller's own profile"),
        (name = "Admin Users", description = "User management for admins"),
        (name = "Admin Courses", description = "Course catalogue management for admins"),
        (name = "Dashboard", description = "Admin and instructor counters"),
        (name = "Instructor Courses", description = "Courses taught by the caller"),
        (name = "Modules", description = "Ordered course modules"),
        (name = "Materials", description = "Module materials and file uploads"),
        (name = "Quizzes", description = "Module quizzes"),
        (name = "Enrollments", description = "Students enrolled in a course"),
        (name = "Student", description = "The caller's enrollments")
    ),
    info(
        title = "LearnSmart Admin API",
        version = "0.1.0",
        description = "Administration API for the LearnSmart learning platform: users, courses, modules, materials, quizzes and enrollments.",
        contact(
            name = "API Support",
            email = "support@learnsmart.app"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes_and_security() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/api/instructor/courses/{course_id}/modules/reorder"));
        assert!(paths.contains_key("/api/instructor/modules/{id}/materials/upload"));
        assert!(paths.contains_key("/api/student/courses"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("QuizDetail"));
    }
}
