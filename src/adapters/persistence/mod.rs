use sqlx::PgPool;

use crate::app_error::AppError;

pub mod account;
pub mod user;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            _ => {
                // Log the actual error for debugging, but don't expose details
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound
        ));
    }

    #[test]
    fn schema_leaves_user_cleanup_to_account_deletion() {
        let schema: String =
            include_str!("../../../migrations/20250101000000_create_accounts_and_users.sql")
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .to_uppercase();

        assert!(schema.contains("CREATE TABLE IF NOT EXISTS USERS"));
        assert!(!schema.contains("REFERENCES"));
        assert!(!schema.contains("CASCADE"));
        assert!(!schema.contains("UNIQUE"));
    }

    #[test]
    fn other_errors_hide_details() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Database(msg) if msg == "Database operation failed"));
    }
}
