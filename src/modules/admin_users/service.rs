use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use learnsmart_core::{AppError, PaginationMeta, hash_password};
use learnsmart_models::{CreateUserDto, PaginatedUsersResponse, User, UserFilterParams, UserRole};

use crate::metrics::track_user_created;
use crate::utils::db_errors::map_db_error;
use crate::utils::search::contains_pattern;

const FILTERS: &str = "($1::user_role IS NULL OR role = $1)
     AND ($2::text IS NULL OR email ILIKE $2 ESCAPE '\\' OR full_name ILIKE $2 ESCAPE '\\')";

pub struct AdminUserService;

impl AdminUserService {
    #[instrument]
    pub async fn list_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let search = contains_pattern(filters.search.as_deref());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM users WHERE {FILTERS}"
        ))
        .bind(filters.role)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT id, email, full_name, role, created_at, updated_at
             FROM users WHERE {FILTERS}
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(filters.role)
        .bind(&search)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, full_name, role, created_at, updated_at",
        )
        .bind(dto.email.trim().to_lowercase())
        .bind(&hashed_password)
        .bind(dto.full_name.trim())
        .bind(dto.role)
        .fetch_one(db)
        .await
        .map_err(|e| map_db_error(e, "A user with this email already exists"))?;

        track_user_created(dto.role.as_str());

        Ok(user)
    }

    /// Changes a user's role. Admins cannot demote themselves, so there is
    /// always at least the acting admin left.
    #[instrument]
    pub async fn update_user_role(
        db: &PgPool,
        actor_id: Uuid,
        id: Uuid,
        role: UserRole,
    ) -> Result<User, AppError> {
        if actor_id == id && role != UserRole::Admin {
            return Err(AppError::bad_request(anyhow!(
                "You cannot remove your own admin role"
            )));
        }

        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2
             RETURNING id, email, full_name, role, created_at, updated_at",
        )
        .bind(role)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument]
    pub async fn delete_user(db: &PgPool, actor_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if actor_id == id {
            return Err(AppError::bad_request(anyhow!(
                "You cannot delete your own account"
            )));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use learnsmart_core::PaginationParams;

    fn dto(email: &str, role: UserRole) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            password: "password123".to_string(),
            full_name: format!("{} user", role),
            role,
        }
    }

    fn filters(role: Option<UserRole>, search: Option<&str>) -> UserFilterParams {
        UserFilterParams {
            role,
            search: search.map(str::to_string),
            pagination: PaginationParams::default(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_users_filters(pool: PgPool) {
        AdminUserService::create_user(&pool, dto("a@example.com", UserRole::Admin))
            .await
            .unwrap();
        AdminUserService::create_user(&pool, dto("i@example.com", UserRole::Instructor))
            .await
            .unwrap();
        AdminUserService::create_user(&pool, dto("s@example.com", UserRole::Student))
            .await
            .unwrap();

        let all = AdminUserService::list_users(&pool, filters(None, None))
            .await
            .unwrap();
        assert_eq!(all.meta.total, 3);

        let instructors =
            AdminUserService::list_users(&pool, filters(Some(UserRole::Instructor), None))
                .await
                .unwrap();
        assert_eq!(instructors.data.len(), 1);
        assert_eq!(instructors.data[0].email, "i@example.com");

        let searched = AdminUserService::list_users(&pool, filters(None, Some("S@EXAMPLE")))
            .await
            .unwrap();
        assert_eq!(searched.meta.total, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_wildcards_match_literally(pool: PgPool) {
        AdminUserService::create_user(&pool, dto("first_last@example.com", UserRole::Student))
            .await
            .unwrap();
        AdminUserService::create_user(&pool, dto("firstxlast@example.com", UserRole::Student))
            .await
            .unwrap();

        let underscore = AdminUserService::list_users(&pool, filters(None, Some("first_last")))
            .await
            .unwrap();
        assert_eq!(underscore.meta.total, 1);
        assert_eq!(underscore.data[0].email, "first_last@example.com");

        let percent = AdminUserService::list_users(&pool, filters(None, Some("%")))
            .await
            .unwrap();
        assert_eq!(percent.meta.total, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_huge_page_returns_empty_page(pool: PgPool) {
        AdminUserService::create_user(&pool, dto("p@example.com", UserRole::Student))
            .await
            .unwrap();

        let mut params = filters(None, None);
        params.pagination = PaginationParams {
            limit: Some(100),
            offset: None,
            page: Some(i64::MAX),
        };
        let page = AdminUserService::list_users(&pool, params).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 1);
        assert!(!page.meta.has_more);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_duplicate_user(pool: PgPool) {
        AdminUserService::create_user(&pool, dto("x@example.com", UserRole::Student))
            .await
            .unwrap();
        let err = AdminUserService::create_user(&pool, dto("x@example.com", UserRole::Student))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_admin_cannot_demote_or_delete_self(pool: PgPool) {
        let admin = AdminUserService::create_user(&pool, dto("me@example.com", UserRole::Admin))
            .await
            .unwrap();

        let err = AdminUserService::update_user_role(&pool, admin.id, admin.id, UserRole::Student)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = AdminUserService::delete_user(&pool, admin.id, admin.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_role_and_delete(pool: PgPool) {
        let admin = AdminUserService::create_user(&pool, dto("boss@example.com", UserRole::Admin))
            .await
            .unwrap();
        let user = AdminUserService::create_user(&pool, dto("u@example.com", UserRole::Student))
            .await
            .unwrap();

        let updated =
            AdminUserService::update_user_role(&pool, admin.id, user.id, UserRole::Instructor)
                .await
                .unwrap();
        assert_eq!(updated.role, UserRole::Instructor);

        AdminUserService::delete_user(&pool, admin.id, user.id)
            .await
            .unwrap();
        let err = AdminUserService::get_user(&pool, user.id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
