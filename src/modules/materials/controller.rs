use anyhow::anyhow;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::{
    CreateMaterialDto, Material, MaterialType, UpdateMaterialDto, UploadMaterialForm,
};

use super::service::{MaterialService, MaterialUpload};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::auth_helpers::load_module_with_access;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/instructor/modules/{id}/materials",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Materials, newest first", body = Vec<Material>),
        (status = 404, description = "Module not found")
    ),
    tag = "Materials",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_materials(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(module_id): Path<Uuid>,
) -> Result<Json<Vec<Material>>, AppError> {
    load_module_with_access(&state.db, &auth_user, module_id).await?;
    Ok(Json(
        MaterialService::list_materials(&state.db, module_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/instructor/modules/{id}/materials",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = CreateMaterialDto,
    responses(
        (status = 201, description = "Material created", body = Material),
        (status = 404, description = "Module not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Materials",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_material(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(module_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateMaterialDto>,
) -> Result<(StatusCode, Json<Material>), AppError> {
    let module = load_module_with_access(&state.db, &auth_user, module_id).await?;
    let material = MaterialService::create_material(&state.db, &module, dto).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::bad_request(anyhow!("Invalid multipart body: {}", err.body_text()))
}

#[utoipa::path(
    post,
    path = "/api/instructor/modules/{id}/materials/upload",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body(content = UploadMaterialForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored and material created", body = Material),
        (status = 400, description = "Missing file, disallowed type or file too large"),
        (status = 404, description = "Module not found")
    ),
    tag = "Materials",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn upload_material(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(module_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Material>), AppError> {
    let module = load_module_with_access(&state.db, &auth_user, module_id).await?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut material_type = MaterialType::Document;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name().unwrap_or_default() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "description" => {
                let text = field.text().await.map_err(multipart_error)?;
                description = Some(text).filter(|d| !d.trim().is_empty());
            }
            "material_type" => {
                let text = field.text().await.map_err(multipart_error)?;
                material_type = text
                    .parse()
                    .map_err(|e: String| AppError::bad_request(anyhow!(e)))?;
            }
            _ => {}
        }
    }

    let (file_name, content_type, content) =
        file.ok_or_else(|| AppError::bad_request(anyhow!("file is required")))?;
    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow!("title is required")))?;
    if title.chars().count() > 200 {
        return Err(AppError::unprocessable(anyhow!(
            "title must be at most 200 characters"
        )));
    }

    let material = MaterialService::upload_material(
        &state.db,
        state.file_storage.as_ref(),
        &module,
        MaterialUpload {
            file_name,
            content_type,
            content,
            title,
            description,
            material_type,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(material)))
}

#[utoipa::path(
    put,
    path = "/api/instructor/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    request_body = UpdateMaterialDto,
    responses(
        (status = 200, description = "Material updated", body = Material),
        (status = 404, description = "Material not found")
    ),
    tag = "Materials",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_material(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateMaterialDto>,
) -> Result<Json<Material>, AppError> {
    MaterialService::load_with_access(&state.db, &auth_user, id).await?;
    Ok(Json(
        MaterialService::update_material(&state.db, id, dto).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/instructor/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 404, description = "Material not found")
    ),
    tag = "Materials",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_material(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let material = MaterialService::load_with_access(&state.db, &auth_user, id).await?;
    MaterialService::delete_material(&state.db, state.file_storage.as_ref(), material).await?;
    Ok(StatusCode::NO_CONTENT)
}
