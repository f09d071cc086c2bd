use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::{
    jwt::{Claim, TokenCodec, TokenLifetimes},
    password::hash_password,
    validators::is_valid_email,
};
use crate::domain::entities::{
    account::Account,
    role::Role,
    user::{NewUser, User},
};
use crate::use_cases::{account::AccountRepo, admin_guard::AdminGuard};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn list_by_account(&self, account_id: Uuid) -> AppResult<Vec<User>>;
    async fn get(&self, account_id: Uuid, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, account_id: Uuid, email: &str) -> AppResult<Option<User>>;
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn update_name(&self, account_id: Uuid, id: Uuid, name: &str) -> AppResult<Option<User>>;
    async fn update_password(
        &self,
        account_id: Uuid,
        id: Uuid,
        password_hash: &str,
    ) -> AppResult<Option<User>>;
    async fn update_role(&self, account_id: Uuid, id: Uuid, role: Role) -> AppResult<Option<User>>;
    async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<Option<User>>;
    async fn delete_by_account(&self, account_id: Uuid) -> AppResult<u64>;
    /// Counts users with `role` across every account.
    async fn count_by_role(&self, role: Role) -> AppResult<i64>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

pub(crate) fn ensure_passwords_match(password: &str, password_again: &str) -> AppResult<()> {
    if password != password_again {
        return Err(AppError::Validation(
            "Validation error passwords didn't match".into(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserUseCases {
    accounts: Arc<dyn AccountRepo>,
    users: Arc<dyn UserRepo>,
    guard: AdminGuard,
    tokens: Arc<TokenCodec>,
    lifetimes: TokenLifetimes,
}

impl UserUseCases {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        users: Arc<dyn UserRepo>,
        tokens: Arc<TokenCodec>,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            accounts,
            guard: AdminGuard::new(users.clone()),
            users,
            tokens,
            lifetimes,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, account_id: Uuid) -> AppResult<Vec<User>> {
        self.require_account(account_id).await?;
        self.users.list_by_account(account_id).await
    }

    #[instrument(skip(self, password))]
    pub async fn create(
        &self,
        account_id: Uuid,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<User> {
        self.require_account(account_id).await?;

        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email format".into()));
        }
        if self.users.find_by_email(account_id, email).await?.is_some() {
            return Err(AppError::MethodNotAllowed("User exist".into()));
        }

        self.users
            .create(NewUser {
                account_id,
                name: Some(name.to_string()),
                email: email.to_string(),
                password_hash: Some(hash_password(password)?),
                role: Role::User,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, account_id: Uuid, id: Uuid) -> AppResult<User> {
        self.users
            .get(account_id, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, account_id: Uuid, id: Uuid, name: &str) -> AppResult<User> {
        self.users
            .update_name(account_id, id, name)
            .await?
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self, password, password_again))]
    pub async fn change_password(
        &self,
        account_id: Uuid,
        id: Uuid,
        password: &str,
        password_again: &str,
    ) -> AppResult<User> {
        ensure_passwords_match(password, password_again)?;
        let hash = hash_password(password)?;
        self.users
            .update_password(account_id, id, &hash)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// The guard runs whenever the target is an admin, even when the new
    /// role is admin as well.
    #[instrument(skip(self))]
    pub async fn change_role(&self, account_id: Uuid, id: Uuid, role: Role) -> AppResult<User> {
        self.guard.assert_not_last_admin(account_id, id).await?;
        self.users
            .update_role(account_id, id, role)
            .await?
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<User> {
        self.guard.assert_not_last_admin(account_id, id).await?;
        self.users
            .delete(account_id, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Mints a `user` token carrying the user's current role.
    #[instrument(skip(self))]
    pub async fn issue_access_token(&self, account_id: Uuid, id: Uuid) -> AppResult<String> {
        let user = self.get(account_id, id).await?;
        let account = self.require_account(account_id).await?;
        self.tokens
            .sign(&Claim::user_access(&user, &account), self.lifetimes.access)
    }

    /// Promotes the user named by a registration claim to admin.
    #[instrument(skip(self, claim))]
    pub async fn finalize_registration(&self, claim: &Claim, account_id: Uuid) -> AppResult<User> {
        let user_id = claim.user_id().ok_or(AppError::Forbidden)?;
        let user = self
            .users
            .update_role(account_id, user_id, Role::Admin)
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!(%account_id, %user_id, "Registration finalized");
        Ok(user)
    }

    async fn require_account(&self, account_id: Uuid) -> AppResult<Account> {
        self.accounts
            .get_by_id(account_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
