//! Quiz models and DTOs.
//!
//! Questions are stored as a JSONB array on the quiz row and are always
//! replaced as a whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PASSING_SCORE: i32 = 70;
pub const MAX_QUESTIONS: usize = 200;

fn default_points() -> i32 {
    1
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuizQuestion {
    #[schema(example = "What does `cargo build` do?")]
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`
    pub correct_option: i32,
    #[serde(default = "default_points")]
    pub points: i32,
}

impl QuizQuestion {
    fn check(&self) -> Result<(), String> {
        let text = self.question.trim();
        if text.is_empty() {
            return Err("question text is required".to_string());
        }
        if self.question.chars().count() > 1000 {
            return Err("question text must be at most 1000 characters".to_string());
        }
        if !(2..=10).contains(&self.options.len()) {
            return Err("must have between 2 and 10 options".to_string());
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err("options must not be empty".to_string());
        }
        if self.correct_option < 0 || self.correct_option as usize >= self.options.len() {
            return Err("correct_option is out of range".to_string());
        }
        if self.points < 1 {
            return Err("points must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Checks every question, reporting the first failure with its 1-based number.
pub fn validate_questions(questions: &[QuizQuestion]) -> Result<(), String> {
    if questions.len() > MAX_QUESTIONS {
        return Err(format!("A quiz may have at most {} questions", MAX_QUESTIONS));
    }
    for (i, question) in questions.iter().enumerate() {
        question
            .check()
            .map_err(|reason| format!("Question {}: {}", i + 1, reason))?;
    }
    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub module_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: i32,
    pub time_limit_minutes: Option<i32>,
    pub questions: Json<Vec<QuizQuestion>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A quiz as returned by the API, with its point total.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizDetail {
    pub id: Uuid,
    pub module_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: i32,
    pub time_limit_minutes: Option<i32>,
    pub question_count: usize,
    pub total_points: i64,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quiz> for QuizDetail {
    fn from(quiz: Quiz) -> Self {
        let questions = quiz.questions.0;
        let total_points = questions.iter().map(|q| i64::from(q.points)).sum();
        Self {
            id: quiz.id,
            module_id: quiz.module_id,
            course_id: quiz.course_id,
            title: quiz.title,
            description: quiz.description,
            passing_score: quiz.passing_score,
            time_limit_minutes: quiz.time_limit_minutes,
            question_count: questions.len(),
            total_points,
            questions,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateQuizDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    #[schema(example = "Module 1 check-in")]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Percentage needed to pass, default 70
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateQuizDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,
    /// Replaces the full question list when present
    pub questions: Option<Vec<QuizQuestion>>,
}
