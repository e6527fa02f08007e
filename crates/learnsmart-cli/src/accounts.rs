use learnsmart_core::hash_password;
use learnsmart_models::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Inserts an admin account. Fails if the email is already registered.
pub async fn create_admin(
    db: &PgPool,
    full_name: &str,
    email: &str,
    password: &str,
) -> CliResult<Uuid> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(format!("'{}' is not a valid email address", email).into());
    }
    if full_name.trim().is_empty() {
        return Err("Full name is required".into());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )
        .into());
    }

    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password, full_name, role)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(&email)
    .bind(&hashed_password)
    .bind(full_name.trim())
    .bind(UserRole::Admin)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this email already exists".into())
}

/// Changes the role of an existing account, looked up by email.
pub async fn set_role(db: &PgPool, email: &str, role: UserRole) -> CliResult<()> {
    let result = sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE email = $2")
        .bind(role)
        .bind(email.trim().to_lowercase())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(format!("No user with email {}", email).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_admin(pool: PgPool) {
        let id = create_admin(&pool, "Site Admin", "Admin@Example.com", "password123")
            .await
            .unwrap();

        let (email, role): (String, UserRole) =
            sqlx::query_as("SELECT email, role FROM users WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(email, "admin@example.com");
        assert_eq!(role, UserRole::Admin);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_admin_duplicate_email(pool: PgPool) {
        create_admin(&pool, "One", "dup@example.com", "password123")
            .await
            .unwrap();
        let err = create_admin(&pool, "Two", "dup@example.com", "password123")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_admin_rejects_short_password(pool: PgPool) {
        assert!(
            create_admin(&pool, "Admin", "short@example.com", "short")
                .await
                .is_err()
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_set_role(pool: PgPool) {
        create_admin(&pool, "Admin", "promote@example.com", "password123")
            .await
            .unwrap();
        set_role(&pool, "promote@example.com", UserRole::Instructor)
            .await
            .unwrap();

        assert!(
            set_role(&pool, "missing@example.com", UserRole::Student)
                .await
                .is_err()
        );
    }
}
