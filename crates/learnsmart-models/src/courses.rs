//! Course domain models and DTOs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use learnsmart_core::serde::{deserialize_optional_from_str, deserialize_optional_uuid};
use learnsmart_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "course_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
            CourseStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            "archived" => Ok(CourseStatus::Archived),
            other => Err(format!("unknown course status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructor_id: Option<Uuid>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course row joined with its instructor's name and content counters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseWithStats {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructor_id: Option<Uuid>,
    pub instructor_name: Option<String>,
    pub status: CourseStatus,
    pub module_count: i64,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    #[schema(example = "Introduction to Rust")]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Must reference a user with the `instructor` role
    pub instructor_id: Option<Uuid>,
    pub status: Option<CourseStatus>,
}

/// Partial course update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub instructor_id: Option<Uuid>,
    /// Unassign the current instructor. Ignored when `instructor_id` is set.
    #[serde(default)]
    pub clear_instructor: bool,
    pub status: Option<CourseStatus>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct CourseFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub status: Option<CourseStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub instructor_id: Option<Uuid>,
    /// Case-insensitive match on the title
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedCoursesResponse {
    pub data: Vec<CourseWithStats>,
    pub meta: PaginationMeta,
}
