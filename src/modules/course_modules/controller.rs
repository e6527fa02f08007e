use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::{
    CreateModuleDto, DeleteModuleParams, DeleteModuleResponse, Module, ModuleWithCounts,
    ReorderModulesDto, UpdateModuleDto,
};

use super::service::ModuleService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::auth_helpers::{ensure_course_access, load_module_with_access};
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/instructor/courses/{course_id}/modules",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Modules in order", body = Vec<ModuleWithCounts>),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Course not found")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_modules(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<ModuleWithCounts>>, AppError> {
    ensure_course_access(&state.db, &auth_user, course_id).await?;
    Ok(Json(ModuleService::list_modules(&state.db, course_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/instructor/courses/{course_id}/modules",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    request_body = CreateModuleDto,
    responses(
        (status = 201, description = "Module created", body = Module),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_module(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateModuleDto>,
) -> Result<(StatusCode, Json<Module>), AppError> {
    ensure_course_access(&state.db, &auth_user, course_id).await?;
    let module = ModuleService::create_module(&state.db, course_id, dto).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    put,
    path = "/api/instructor/courses/{course_id}/modules/reorder",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    request_body = ReorderModulesDto,
    responses(
        (status = 200, description = "Modules in their new order", body = Vec<ModuleWithCounts>),
        (status = 400, description = "module_ids is not a permutation of the course's modules"),
        (status = 403, description = "Not the course instructor")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn reorder_modules(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ReorderModulesDto>,
) -> Result<Json<Vec<ModuleWithCounts>>, AppError> {
    ensure_course_access(&state.db, &auth_user, course_id).await?;
    let modules = ModuleService::reorder_modules(&state.db, course_id, &dto.module_ids).await?;
    Ok(Json(modules))
}

#[utoipa::path(
    get,
    path = "/api/instructor/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Module with counts", body = ModuleWithCounts),
        (status = 404, description = "Module not found")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_module(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ModuleWithCounts>, AppError> {
    load_module_with_access(&state.db, &auth_user, id).await?;
    Ok(Json(ModuleService::get_module(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/instructor/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = UpdateModuleDto,
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 404, description = "Module not found")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_module(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateModuleDto>,
) -> Result<Json<Module>, AppError> {
    let module = load_module_with_access(&state.db, &auth_user, id).await?;
    Ok(Json(
        ModuleService::update_module(&state.db, module, dto).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/instructor/modules/{id}",
    params(
        ("id" = Uuid, Path, description = "Module ID"),
        DeleteModuleParams
    ),
    responses(
        (status = 200, description = "Module deleted", body = DeleteModuleResponse),
        (status = 404, description = "Module not found"),
        (status = 409, description = "Module has materials or quizzes and cascade was not set")
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_module(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteModuleParams>,
) -> Result<Json<DeleteModuleResponse>, AppError> {
    let module = load_module_with_access(&state.db, &auth_user, id).await?;
    let deleted = ModuleService::delete_module(
        &state.db,
        state.file_storage.as_ref(),
        module,
        params.cascade.unwrap_or(false),
    )
    .await?;
    Ok(Json(deleted))
}
