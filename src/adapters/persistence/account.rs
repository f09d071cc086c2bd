use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::account::Account,
    use_cases::account::AccountRepo,
};

const ACCOUNT_COLUMNS: &str = "id, name, url_friendly_name, created_at, updated_at";

// Account struct as stored in the db.
#[derive(sqlx::FromRow, Debug)]
struct AccountDb {
    id: Uuid,
    name: String,
    url_friendly_name: String,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl From<AccountDb> for Account {
    fn from(row: AccountDb) -> Self {
        Account {
            id: row.id,
            name: row.name,
            url_friendly_name: row.url_friendly_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl AccountRepo for PostgresPersistence {
    async fn list(&self) -> AppResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountDb>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountDb>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(Account::from))
    }

    async fn find_by_url_friendly_name(
        &self,
        url_friendly_name: &str,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountDb>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE url_friendly_name = $1 LIMIT 1"
        ))
        .bind(url_friendly_name)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(Account::from))
    }

    async fn create(&self, name: &str, url_friendly_name: &str) -> AppResult<Account> {
        let row = sqlx::query_as::<_, AccountDb>(&format!(
            "INSERT INTO accounts (id, name, url_friendly_name) VALUES ($1, $2, $3) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(url_friendly_name)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.into())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountDb>(&format!(
            "UPDATE accounts SET name = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(Account::from))
    }

    async fn update_url_friendly_name(
        &self,
        id: Uuid,
        url_friendly_name: &str,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountDb>(&format!(
            "UPDATE accounts SET url_friendly_name = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(url_friendly_name)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(Account::from))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountDb>(&format!(
            "DELETE FROM accounts WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(Account::from))
    }
}
