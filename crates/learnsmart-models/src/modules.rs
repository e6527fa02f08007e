//! Course module models and DTOs.
//!
//! Modules of a course are kept at contiguous zero-based `order_index`
//! values, and each module's `prerequisite_module_id` points at the module
//! immediately before it. The first module has no prerequisite.

use chrono::{DateTime, Utc};
use learnsmart_core::serde::deserialize_optional_from_str;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub prerequisite_module_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ModuleWithCounts {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub prerequisite_module_id: Option<Uuid>,
    pub material_count: i64,
    pub quiz_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateModuleDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    #[schema(example = "Getting started")]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Position to insert at. Defaults to the end; values past the end are clamped.
    #[validate(range(min = 0))]
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateModuleDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Move the module to this position
    #[validate(range(min = 0))]
    pub order_index: Option<i32>,
}

/// The complete new order of a course's modules.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReorderModulesDto {
    #[validate(length(max = 1000))]
    pub module_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct DeleteModuleParams {
    /// Also delete the module's materials and quizzes
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub cascade: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteModuleResponse {
    pub deleted_materials: i64,
    pub deleted_quizzes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_module_dto_validation() {
        let dto = CreateModuleDto {
            title: "Week 1".to_string(),
            description: None,
            order_index: Some(0),
        };
        assert!(dto.validate().is_ok());

    #[test]
    fn test_whitespace_title_is_rejected() {
        let dto = CreateModuleDto {
            title: "   ".to_string(),
            description: None,
            order_index: None,
        };
        assert!(dto.validate().is_err());

        let update = UpdateModuleDto {
            title: Some("\t ".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

        let negative = CreateModuleDto {
            order_index: Some(-1),
            ..dto.clone()
        };
        assert!(negative.validate().is_err());

        let empty_title = CreateModuleDto {
            title: String::new(),
            ..dto
        };
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_delete_module_params() {
        let params: DeleteModuleParams = serde_json::from_str(r#"{"cascade": "true"}"#).unwrap();
        assert_eq!(params.cascade, Some(true));

        let params: DeleteModuleParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.cascade, None);

        assert!(serde_json::from_str::<DeleteModuleParams>(r#"{"cascade": "maybe"}"#).is_err());
    }
}
