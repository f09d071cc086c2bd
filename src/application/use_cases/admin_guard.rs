use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::role::Role;
use crate::use_cases::user::UserRepo;

/// Keeps the last administrator from being demoted or deleted.
///
/// Admins are counted across all accounts, not per account.
#[derive(Clone)]
pub struct AdminGuard {
    users: Arc<dyn UserRepo>,
}

impl AdminGuard {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    #[instrument(skip(self))]
    pub async fn assert_not_last_admin(&self, account_id: Uuid, target_user_id: Uuid) -> AppResult<()> {
        let target = self
            .users
            .get(account_id, target_user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !target.role.is_admin() {
            return Ok(());
        }

        let admins = self.users.count_by_role(Role::Admin).await?;
        if admins < 2 {
            tracing::warn!(%account_id, %target_user_id, admins, "Refusing to remove last admin");
            return Err(AppError::MethodNotAllowed(
                "Removing the last admin is not allowed".into(),
            ));
        }

        Ok(())
    }
}
