//! Course material models and DTOs.
//!
//! A material belongs to one module. Links and videos point at an external
//! `url`; uploaded documents additionally carry the storage key in
//! `file_path` and the file's size and MIME type.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "material_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    #[default]
    Document,
    Video,
    Link,
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MaterialType::Document => "document",
            MaterialType::Video => "video",
            MaterialType::Link => "link",
        };
        f.write_str(s)
    }
}

impl FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(MaterialType::Document),
            "video" => Ok(MaterialType::Video),
            "link" => Ok(MaterialType::Link),
            other => Err(format!("unknown material type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Material {
    pub id: Uuid,
    pub module_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
    pub url: Option<String>,
    /// Storage key of an uploaded file
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !url.chars().any(char::is_whitespace) => Ok(()),
        _ => {
            let mut err = ValidationError::new("http_url");
            err.message = Some("url must be an http(s) URL".into());
            Err(err)
        }
    }
}

/// JSON material creation. Every type needs a URL here; files go through
/// the multipart upload endpoint instead.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    #[schema(example = "Lecture slides")]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub material_type: MaterialType,
    #[validate(length(max = 2048), custom(function = "validate_http_url"))]
    #[schema(example = "https://example.com/slides.pdf")]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMaterialDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 2048), custom(function = "validate_http_url"))]
    pub url: Option<String>,
}

/// Multipart body of the upload endpoint. Documentation only; the handler
/// reads the fields from the stream.
#[derive(Debug, ToSchema)]
pub struct UploadMaterialForm {
    #[schema(format = Binary)]
    pub file: String,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `document`
    pub material_type: Option<MaterialType>,
}
