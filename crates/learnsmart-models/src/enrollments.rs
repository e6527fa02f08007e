//! Enrollment models and DTOs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use learnsmart_core::serde::deserialize_optional_from_str;
use learnsmart_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Completed,
    Dropped,
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
        };
        f.write_str(s)
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(EnrollmentStatus::Active),
            "completed" => Ok(EnrollmentStatus::Completed),
            "dropped" => Ok(EnrollmentStatus::Dropped),
            other => Err(format!("unknown enrollment status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub status: EnrollmentStatus,
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An enrollment joined with the student's name and email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EnrolledStudent {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub status: EnrollmentStatus,
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identify the student either by id or by email, not both.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EnrollStudentDto {
    pub student_id: Option<Uuid>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEnrollmentDto {
    pub status: Option<EnrollmentStatus>,
    #[validate(range(min = 0, max = 100))]
    pub progress: Option<i32>,
}

impl UpdateEnrollmentDto {
    /// Status to store: reaching 100% progress completes the enrollment
    /// unless a status was given explicitly.
    pub fn effective_status(&self) -> Option<EnrollmentStatus> {
        match (self.status, self.progress) {
            (Some(status), _) => Some(status),
            (None, Some(100)) => Some(EnrollmentStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct EnrollmentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub status: Option<EnrollmentStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedEnrolledStudentsResponse {
    pub data: Vec<EnrolledStudent>,
    pub meta: PaginationMeta,
}

/// A course seen from the enrolled student's side.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentCourse {
    pub enrollment_id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub course_description: Option<String>,
    pub instructor_name: Option<String>,
    pub module_count: i64,
    pub status: EnrollmentStatus,
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
}
