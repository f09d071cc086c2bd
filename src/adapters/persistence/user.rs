use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::{
        role::Role,
        user::{NewUser, User},
    },
    use_cases::user::UserRepo,
};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, account_id, created_at, updated_at";

// User struct as stored in the db.
#[derive(sqlx::FromRow, Debug)]
struct UserDb {
    id: Uuid,
    name: Option<String>,
    email: String,
    password_hash: Option<String>,
    role: String,
    account_id: Uuid,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl TryFrom<UserDb> for User {
    type Error = AppError;

    fn try_from(row: UserDb) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|_| {
            tracing::error!(user_id = %row.id, role = %row.role, "Unknown role stored for user");
            AppError::Database("Database operation failed".into())
        })?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            account_id: row.account_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_user(row: Option<UserDb>) -> AppResult<Option<User>> {
    row.map(User::try_from).transpose()
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn list_by_account(&self, account_id: Uuid) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_id = $1 ORDER BY created_at"
        ))
        .bind(account_id)
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn get(&self, account_id: Uuid, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND account_id = $2"
        ))
        .bind(id)
        .bind(account_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        into_user(row)
    }

    async fn find_by_email(&self, account_id: Uuid, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_id = $1 AND email = $2 LIMIT 1"
        ))
        .bind(account_id)
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        into_user(row)
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role, account_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role.as_ref())
        .bind(user.account_id)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        User::try_from(row)
    }

    async fn update_name(&self, account_id: Uuid, id: Uuid, name: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "UPDATE users SET name = $3, updated_at = now() WHERE id = $1 AND account_id = $2 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        into_user(row)
    }

    async fn update_password(
        &self,
        account_id: Uuid,
        id: Uuid,
        password_hash: &str,
    ) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "UPDATE users SET password_hash = $3, updated_at = now() \
             WHERE id = $1 AND account_id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(password_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        into_user(row)
    }

    async fn update_role(&self, account_id: Uuid, id: Uuid, role: Role) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "UPDATE users SET role = $3, updated_at = now() WHERE id = $1 AND account_id = $2 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(role.as_ref())
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        into_user(row)
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "DELETE FROM users WHERE id = $1 AND account_id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        into_user(row)
    }

    async fn delete_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE account_id = $1")
            .bind(account_id)
            .execute(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }

    async fn count_by_role(&self, role: Role) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_ref())
            .fetch_one(self.pool())
            .await
            .map_err(AppError::from)
    }
}
