//! Row builders for service tests.

use sqlx::PgPool;
use uuid::Uuid;

use learnsmart_models::UserRole;

use crate::middleware::auth::AuthUser;

pub async fn insert_user(pool: &PgPool, email: &str, role: UserRole) -> AuthUser {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password, full_name, role)
         VALUES ($1, 'not-a-real-hash', $2, $3) RETURNING id",
    )
    .bind(email)
    .bind(format!("{} user", role))
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    AuthUser {
        id,
        email: email.to_string(),
        full_name: format!("{} user", role),
        role,
    }
}

pub async fn insert_course(pool: &PgPool, title: &str, instructor_id: Option<Uuid>) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (title, instructor_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(title)
    .bind(instructor_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
