//! User domain models and DTOs.
//!
//! Every account carries exactly one [`UserRole`], stored in the `users.role`
//! column. The role decides which dashboard a user lands on after login and
//! which route groups they may call.

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

/// Account role, backed by the `user_role` Postgres enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Instructor,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Instructor => "instructor",
            UserRole::Student => "student",
        }
    }

    /// Where the frontend sends a user after signing in.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Admin => "/admin/dashboard",
            UserRole::Instructor => "/instructor/dashboard",
            UserRole::Student => "/student/dashboard",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "instructor" => Ok(UserRole::Instructor),
            "student" => Ok(UserRole::Student),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A user as exposed by the API. The password hash never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row including the bcrypt hash, used for credential checks.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithPassword {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserWithPassword> for User {
    fn from(user: UserWithPassword) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Admin-side user creation. Unlike self-registration, any role is allowed.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email)]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRoleDto {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct UserFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub role: Option<UserRole>,
    /// Case-insensitive match on email or full name
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [UserRole::Admin, UserRole::Instructor, UserRole::Student] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("teacher".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_whitespace_full_name_is_rejected() {
        let update = UpdateProfileDto {
            full_name: Some("   ".to_string()),
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(UserRole::Admin.dashboard_path(), "/admin/dashboard");
        assert_eq!(UserRole::Instructor.dashboard_path(), "/instructor/dashboard");
        assert_eq!(UserRole::Student.dashboard_path(), "/student/dashboard");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Instructor).unwrap(),
            r#""instructor""#
        );
        let role: UserRole = serde_json::from_str(r#""student""#).unwrap();
        assert_eq!(role, UserRole::Student);
    }

    #[test]
    fn test_create_user_dto_validation() {
        let dto = CreateUserDto {
            email: "new@example.com".to_string(),
            password: "password123".to_string(),
            full_name: "New User".to_string(),
            role: UserRole::Admin,
        };
        assert!(dto.validate().is_ok());

        let bad_email = CreateUserDto {
            email: "not-an-email".to_string(),
            ..dto.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = CreateUserDto {
            password: "short".to_string(),
            ..dto.clone()
        };
        assert!(short_password.validate().is_err());

        let empty_name = CreateUserDto {
            full_name: String::new(),
            ..dto
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_change_password_dto_validation() {
        let dto = ChangePasswordDto {
            current_password: "oldpassword".to_string(),
            new_password: "x".repeat(129),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_user_filter_params_empty_role() {
        let params: UserFilterParams = serde_json::from_str(r#"{"role": ""}"#).unwrap();
        assert!(params.role.is_none());

        let params: UserFilterParams = serde_json::from_str(r#"{"role": "instructor"}"#).unwrap();
        assert_eq!(params.role, Some(UserRole::Instructor));
    }

    #[test]
    fn test_user_without_password_conversion() {
        let now = Utc::now();
        let row = UserWithPassword {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            password: "$2b$12$hash".to_string(),
            full_name: "A".to_string(),
            role: UserRole::Student,
            created_at: now,
            updated_at: now,
        };
        let user: User = row.clone().into();
        assert_eq!(user.id, row.id);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
    }
}
