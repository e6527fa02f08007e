use anyhow::anyhow;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, instrument};
use uuid::Uuid;

use learnsmart_core::AppError;
use learnsmart_models::{
    CreateQuizDto, DEFAULT_PASSING_SCORE, Module, Quiz, QuizDetail, UpdateQuizDto,
    validate_questions,
};

use crate::middleware::auth::AuthUser;
use crate::utils::auth_helpers::ensure_course_access;

const QUIZ_COLUMNS: &str = "id, module_id, course_id, title, description, passing_score,
     time_limit_minutes, questions, created_at, updated_at";

pub struct QuizService;

impl QuizService {
    async fn fetch(db: &PgPool, id: Uuid) -> Result<Quiz, AppError> {
        sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Quiz not found")))
    }

    /// Loads a quiz and checks access to its course.
    pub async fn load_with_access(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Quiz, AppError> {
        let quiz = Self::fetch(db, id).await?;
        ensure_course_access(db, auth_user, quiz.course_id).await?;
        Ok(quiz)
    }

    #[instrument(skip(db))]
    pub async fn list_quizzes(db: &PgPool, module_id: Uuid) -> Result<Vec<QuizDetail>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE module_id = $1 ORDER BY created_at"
        ))
        .bind(module_id)
        .fetch_all(db)
        .await?;

        Ok(quizzes.into_iter().map(QuizDetail::from).collect())
    }

    #[instrument(skip(db, module, dto), fields(module_id = %module.id, title = %dto.title))]
    pub async fn create_quiz(
        db: &PgPool,
        module: &Module,
        dto: CreateQuizDto,
    ) -> Result<QuizDetail, AppError> {
        validate_questions(&dto.questions).map_err(|e| AppError::unprocessable(anyhow!(e)))?;

        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "INSERT INTO quizzes
                (module_id, course_id, title, description, passing_score,
                 time_limit_minutes, questions)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(module.id)
        .bind(module.course_id)
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.passing_score.unwrap_or(DEFAULT_PASSING_SCORE))
        .bind(dto.time_limit_minutes)
        .bind(Json(&dto.questions))
        .fetch_one(db)
        .await?;

        info!(quiz_id = %quiz.id, questions = dto.questions.len(), "Quiz created");

        Ok(quiz.into())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_quiz(
        db: &PgPool,
        id: Uuid,
        dto: UpdateQuizDto,
    ) -> Result<QuizDetail, AppError> {
        if let Some(questions) = &dto.questions {
            validate_questions(questions).map_err(|e| AppError::unprocessable(anyhow!(e)))?;
        }

        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "UPDATE quizzes SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                passing_score = COALESCE($3, passing_score),
                time_limit_minutes = COALESCE($4, time_limit_minutes),
                questions = COALESCE($5, questions),
                updated_at = NOW()
             WHERE id = $6
             RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(dto.title.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.passing_score)
        .bind(dto.time_limit_minutes)
        .bind(dto.questions.as_ref().map(Json))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Quiz not found")))?;

        Ok(quiz.into())
    }

    #[instrument(skip(db))]
    pub async fn delete_quiz(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Quiz not found")));
        }
        Ok(())
    }
}
