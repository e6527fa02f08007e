use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use learnsmart_core::file_storage::extension_for_mime;
use learnsmart_core::{AppError, FileStorage};
use learnsmart_models::{CreateMaterialDto, Material, MaterialType, Module, UpdateMaterialDto};

use crate::metrics::track_material_uploaded;
use crate::middleware::auth::AuthUser;
use crate::utils::auth_helpers::ensure_course_access;
use crate::utils::files::remove_stored_files;

const MATERIAL_COLUMNS: &str = "id, module_id, course_id, title, description, material_type, url,
     file_path, file_size, mime_type, created_at, updated_at";

/// A file received through the multipart upload endpoint.
#[derive(Debug)]
pub struct MaterialUpload {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
    pub title: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
}

pub struct MaterialService;

impl MaterialService {
    /// Loads a material and checks access to its course.
    pub async fn load_with_access(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Material, AppError> {
        let material = sqlx::query_as::<_, Material>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM course_materials WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Material not found")))?;

        ensure_course_access(db, auth_user, material.course_id).await?;

        Ok(material)
    }

    #[instrument(skip(db))]
    pub async fn list_materials(db: &PgPool, module_id: Uuid) -> Result<Vec<Material>, AppError> {
        let materials = sqlx::query_as::<_, Material>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM course_materials
             WHERE module_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(module_id)
        .fetch_all(db)
        .await?;
        Ok(materials)
    }

    #[instrument(skip(db, module, dto), fields(module_id = %module.id))]
    pub async fn create_material(
        db: &PgPool,
        module: &Module,
        dto: CreateMaterialDto,
    ) -> Result<Material, AppError> {
        let material = sqlx::query_as::<_, Material>(&format!(
            "INSERT INTO course_materials (module_id, course_id, title, description, material_type, url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {MATERIAL_COLUMNS}"
        ))
        .bind(module.id)
        .bind(module.course_id)
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.material_type)
        .bind(dto.url.trim())
        .fetch_one(db)
        .await?;

        Ok(material)
    }

    /// Stores an uploaded file under
    /// `materials/{course_id}/{module_id}/{uuid}.{ext}` and records it.
    #[instrument(skip(db, storage, module, upload), fields(
        module_id = %module.id,
        file_name = %upload.file_name,
        size = upload.content.len()
    ))]
    pub async fn upload_material(
        db: &PgPool,
        storage: &dyn FileStorage,
        module: &Module,
        upload: MaterialUpload,
    ) -> Result<Material, AppError> {
        storage
            .check_upload(&upload.content_type, upload.content.len())
            .map_err(AppError::bad_request)?;

        let key = format!(
            "materials/{}/{}/{}.{}",
            module.course_id,
            module.id,
            Uuid::new_v4(),
            extension_for_mime(&upload.content_type)
        );

        let key = storage
            .save(&key, &upload.content)
            .await
            .map_err(AppError::internal)?;
        let url = storage.get_url(&key).map_err(AppError::internal)?;
        let size = upload.content.len();

        let inserted = sqlx::query_as::<_, Material>(&format!(
            "INSERT INTO course_materials
                (module_id, course_id, title, description, material_type, url,
                 file_path, file_size, mime_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {MATERIAL_COLUMNS}"
        ))
        .bind(module.id)
        .bind(module.course_id)
        .bind(upload.title.trim())
        .bind(&upload.description)
        .bind(upload.material_type)
        .bind(&url)
        .bind(&key)
        .bind(i64::try_from(size).unwrap_or(i64::MAX))
        .bind(&upload.content_type)
        .fetch_one(db)
        .await;

        let material = match inserted {
            Ok(material) => material,
            Err(e) => {
                if let Err(cleanup) = storage.delete(&key).await {
                    warn!(key = %key, error = %cleanup, "Failed to remove orphaned upload");
                }
                return Err(e.into());
            }
        };

        track_material_uploaded(size);
        info!(material_id = %material.id, key = %key, "Material uploaded");

        Ok(material)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_material(
        db: &PgPool,
        id: Uuid,
        dto: UpdateMaterialDto,
    ) -> Result<Material, AppError> {
        sqlx::query_as::<_, Material>(&format!(
            "UPDATE course_materials SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                url = COALESCE($3, url),
                updated_at = NOW()
             WHERE id = $4
             RETURNING {MATERIAL_COLUMNS}"
        ))
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.url.as_deref().map(str::trim))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Material not found")))
    }

    #[instrument(skip(db, storage, material), fields(material_id = %material.id))]
    pub async fn delete_material(
        db: &PgPool,
        storage: &dyn FileStorage,
        material: Material,
    ) -> Result<(), AppError> {
        if let Some(file_path) = material.file_path {
            remove_stored_files(storage, [file_path]).await;
        }

        sqlx::query("DELETE FROM course_materials WHERE id = $1")
            .bind(material.id)
            .execute(db)
            .await?;

        Ok(())
    }
}
