use anyhow::anyhow;
use learnsmart_core::AppError;

/// Maps a sqlx error to an HTTP error.
///
/// Unique violations become 409 with `conflict_message`. Foreign key and
/// check violations are the caller's fault (400 and 422). Anything else is a 500.
pub fn map_db_error(err: sqlx::Error, conflict_message: &str) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => AppError::not_found(anyhow!("Record not found")),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::conflict(anyhow!("{}", conflict_message))
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::bad_request(anyhow!("Referenced record does not exist"))
        }
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
            AppError::unprocessable(anyhow!("Value violates a constraint"))
        }
        _ => AppError::database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_row_not_found_is_404() {
        let err = map_db_error(sqlx::Error::RowNotFound, "exists");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_errors_are_500() {
        let err = map_db_error(sqlx::Error::PoolTimedOut, "exists");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
