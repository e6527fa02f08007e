use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::{CreateQuizDto, QuizDetail, UpdateQuizDto};

use super::service::QuizService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::auth_helpers::load_module_with_access;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/instructor/modules/{id}/quizzes",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Quizzes of the module", body = Vec<QuizDetail>),
        (status = 404, description = "Module not found")
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_quizzes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(module_id): Path<Uuid>,
) -> Result<Json<Vec<QuizDetail>>, AppError> {
    load_module_with_access(&state.db, &auth_user, module_id).await?;
    Ok(Json(QuizService::list_quizzes(&state.db, module_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/instructor/modules/{id}/quizzes",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = CreateQuizDto,
    responses(
        (status = 201, description = "Quiz created", body = QuizDetail),
        (status = 404, description = "Module not found"),
        (status = 422, description = "Invalid quiz or question")
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(module_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateQuizDto>,
) -> Result<(StatusCode, Json<QuizDetail>), AppError> {
    let module = load_module_with_access(&state.db, &auth_user, module_id).await?;
    let quiz = QuizService::create_quiz(&state.db, &module, dto).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    get,
    path = "/api/instructor/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz with questions", body = QuizDetail),
        (status = 404, description = "Quiz not found")
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizDetail>, AppError> {
    let quiz = QuizService::load_with_access(&state.db, &auth_user, id).await?;
    Ok(Json(quiz.into()))
}

#[utoipa::path(
    put,
    path = "/api/instructor/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = UpdateQuizDto,
    responses(
        (status = 200, description = "Quiz updated", body = QuizDetail),
        (status = 404, description = "Quiz not found"),
        (status = 422, description = "Invalid quiz or question")
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateQuizDto>,
) -> Result<Json<QuizDetail>, AppError> {
    QuizService::load_with_access(&state.db, &auth_user, id).await?;
    Ok(Json(QuizService::update_quiz(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/instructor/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 404, description = "Quiz not found")
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    QuizService::load_with_access(&state.db, &auth_user, id).await?;
    QuizService::delete_quiz(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
